//! Same-Origin Check
//!
//! Remote vector sources are only fetched from the document's own origin.

use url::Url;

use crate::MediaError;

/// Resolve `src` for fetching, refusing anything outside the document origin
///
/// Relative paths are always allowed. Absolute and scheme-relative URLs must
/// share the origin of `location`; without a location they are refused.
pub fn resolve_same_origin(src: &str, location: Option<&Url>) -> Result<String, MediaError> {
    let blocked = || MediaError::CrossOriginBlocked(src.to_string());

    match Url::parse(src) {
        Ok(absolute) => {
            let location = location.ok_or_else(blocked)?;
            if absolute.origin() == location.origin() {
                Ok(absolute.into())
            } else {
                Err(blocked())
            }
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => match location {
            Some(location) => {
                let joined = location.join(src).map_err(|_| blocked())?;
                if joined.origin() == location.origin() {
                    Ok(joined.into())
                } else {
                    Err(blocked())
                }
            }
            None if src.starts_with("//") => Err(blocked()),
            None => Ok(src.to_string()),
        },
        Err(_) => Err(blocked()),
    }
}
