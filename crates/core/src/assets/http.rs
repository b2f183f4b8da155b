use std::time::Duration;

use crate::{AppEvent, CoverImage, CoverLoader, CoverRequestId, EventSender, Result, VisualiserError};

/// Fetches covers over HTTP on a worker thread and decodes them to RGBA8.
#[derive(Clone)]
pub struct HttpCoverLoader {
    agent: ureq::Agent,
    events: EventSender,
}

impl HttpCoverLoader {
    pub fn new(events: EventSender, timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
            events,
        }
    }
}

impl CoverLoader for HttpCoverLoader {
    fn request(&mut self, id: CoverRequestId, url: &str) {
        let agent = self.agent.clone();
        let events = self.events.clone();
        let url = url.to_string();
        std::thread::spawn(move || {
            let result = fetch_cover(&agent, &url).map_err(|err| err.to_string());
            if events
                .send(AppEvent::CoverLoaded {
                    request: id,
                    result,
                })
                .is_err()
            {
                tracing::debug!(request = id.0, "frame loop gone, dropping cover");
            }
        });
    }
}

fn fetch_cover(agent: &ureq::Agent, url: &str) -> Result<CoverImage> {
    let mut response = agent
        .get(url)
        .call()
        .map_err(|err| VisualiserError::Asset(format!("{url}: {err}")))?;
    let bytes = response
        .body_mut()
        .read_to_vec()
        .map_err(|err| VisualiserError::Asset(format!("{url}: {err}")))?;
    decode_cover(&bytes)
}

/// Decodes JPEG or PNG bytes into an RGBA8 image.
pub(crate) fn decode_cover(bytes: &[u8]) -> Result<CoverImage> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    Ok(CoverImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_bytes() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let cover = decode_cover(&png).unwrap();
        assert_eq!((cover.width, cover.height), (3, 2));
        assert_eq!(&cover.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_bytes_are_an_asset_error() {
        let err = decode_cover(b"not an image").unwrap_err();
        assert!(matches!(err, VisualiserError::Asset(_)));
    }
}
