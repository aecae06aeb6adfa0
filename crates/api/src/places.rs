use std::time::Duration;

use hyper::{header::HeaderValue, Uri};
use serde::Deserialize;
use url::Url;

use crate::fetch::Fetcher;

const SEARCH_ENDPOINT: &str = "https://api.foursquare.com/v3/places/search";

/// Cut of the photo served to the client, width by height.
const PHOTO_SIZE: &str = "800x600";

/// Budget for each of the two Foursquare calls.
const TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the Foursquare Places API. Only used to decorate questions
/// with a photo of the answer, so every failure degrades to "no photo".
pub struct Places {
    auth: HeaderValue,
    fetcher: Fetcher,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Deserialize)]
struct Place {
    fsq_id: String,
}

#[derive(Deserialize)]
struct Photo {
    prefix: String,
    suffix: String,
}

impl Places {
    /// Fails when the key cannot be carried in a header.
    pub fn new(key: &str, fetcher: Fetcher) -> Option<Self> {
        let auth = HeaderValue::from_str(key).ok()?;
        Some(Self { auth, fetcher })
    }

    /// Looks up a photo for the named place: search for its Foursquare ID
    /// first, then list that place's photos and assemble the first one.
    pub async fn lookup(&self, place: &str) -> Option<Box<str>> {
        let query = place.trim().to_lowercase();
        let url = Url::parse_with_params(SEARCH_ENDPOINT, [("query", query.as_str()), ("limit", "1")]).ok()?;
        let uri: Uri = url.as_str().parse().ok()?;

        let search: SearchResponse = match self.fetcher.get_json(uri, Some(&self.auth), TIMEOUT).await {
            Ok(search) => search,
            Err(err) => {
                log::warn!("place search for {query:?} failed: {err}");
                return None;
            }
        };
        let Place { fsq_id } = search.results.into_iter().next()?;

        let uri: Uri = format!("https://api.foursquare.com/v3/places/{fsq_id}/photos?limit=1").parse().ok()?;
        let photos: Vec<Photo> = match self.fetcher.get_json(uri, Some(&self.auth), TIMEOUT).await {
            Ok(photos) => photos,
            Err(err) => {
                log::warn!("photo listing for {query:?} failed: {err}");
                return None;
            }
        };

        let Photo { prefix, suffix } = photos.into_iter().next()?;
        Some(format!("{prefix}{PHOTO_SIZE}{suffix}").into_boxed_str())
    }
}
