use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::str;

use crate::errors::SyncError;

/// Parses a PROPFIND multi-status body into the backup filenames it lists.
///
/// Extracts every `href` element (tolerating namespace-prefixed tag names),
/// keeps only entries whose path ends in `.json` (the collection itself and
/// any stray objects are excluded), and URL-decodes the last path segment
/// of each as the filename.
pub fn parse_backup_listing(xml_text: &str) -> Result<Vec<String>, SyncError> {
    let mut reader = Reader::from_reader(xml_text.as_bytes());
    reader.config_mut().trim_text(true);

    let mut filenames = Vec::new();
    let mut in_href = false;
    let mut current_href = String::new();

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if local_name(e.name().local_name().as_ref())? == "href" {
                    in_href = true;
                    current_href.clear();
                }
            }
            Ok(Event::Text(e)) => {
                if in_href {
                    let text = e.unescape().map_err(|e| SyncError::Parse {
                        details: format!("invalid XML escape in href: {}", e),
                    })?;
                    current_href.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                if local_name(e.name().local_name().as_ref())? == "href" {
                    in_href = false;
                    if let Some(name) = filename_from_href(current_href.trim()) {
                        filenames.push(name);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SyncError::Parse {
                    details: format!("invalid multi-status XML: {}", e),
                })
            }
            _ => {}
        }

        buf.clear();
    }

    Ok(filenames)
}

/// Extracts the decoded filename from an href path, or `None` for entries
/// that are not backup objects (the collection href ends in a slash).
fn filename_from_href(href: &str) -> Option<String> {
    if href.is_empty() || href.ends_with('/') {
        return None;
    }

    let segment = href.rsplit('/').next()?;
    if !segment.ends_with(".json") {
        return None;
    }

    let name = urlencoding::decode(segment)
        .map(|decoded| decoded.to_string())
        .unwrap_or_else(|_| segment.to_string());

    Some(name)
}

fn local_name(bytes: &[u8]) -> Result<String, SyncError> {
    str::from_utf8(bytes)
        .map(|name| name.to_string())
        .map_err(|e| SyncError::Parse {
            details: format!("invalid UTF-8 in element name: {}", e),
        })
}
