use pw_core::text::{focus_keyphrase, meta_description, EDITORIAL_YEAR};
use serde::Serialize;

/// Yoast SEO post meta derived from the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoMeta {
    #[serde(rename = "_yoast_wpseo_focuskw")]
    pub focus_keyword: String,
    #[serde(rename = "_yoast_wpseo_metadesc")]
    pub meta_description: String,
    #[serde(rename = "_yoast_wpseo_title")]
    pub title: String,
    #[serde(rename = "_yoast_wpseo_is_cornerstone")]
    pub cornerstone: &'static str,
    #[serde(rename = "_yoast_wpseo_meta-robots-noindex")]
    pub robots_noindex: &'static str,
    #[serde(rename = "_yoast_wpseo_meta-robots-nofollow")]
    pub robots_nofollow: &'static str,
    #[serde(rename = "_yoast_wpseo_meta-robots-adv")]
    pub robots_advanced: &'static str,
    #[serde(rename = "_yoast_wpseo_meta-robots-max-snippet")]
    pub max_snippet: &'static str,
    #[serde(rename = "_yoast_wpseo_meta-robots-max-imagepreview")]
    pub max_image_preview: &'static str,
    #[serde(rename = "_yoast_wpseo_meta-robots-max-videopreview")]
    pub max_video_preview: &'static str,
}

impl SeoMeta {
    pub fn for_title(title: &str) -> Self {
        Self {
            focus_keyword: focus_keyphrase(title),
            meta_description: meta_description(title),
            title: format!("{} - Best Guide {}", title, EDITORIAL_YEAR),
            cornerstone: "on",
            robots_noindex: "0",
            robots_nofollow: "0",
            robots_advanced: "none",
            max_snippet: "-1",
            max_image_preview: "large",
            max_video_preview: "-1",
        }
    }
}
