use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use teloxide::types::{FileId, InputFile};

/// Where a piece of media comes from. Exactly one of `file_id`, `url` or
/// `path` in the config, e.g. `uh_ska = { file_id = "CAACAgIAAxk..." }`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetRef {
    /// File already uploaded to Telegram
    FileId(String),
    /// Fetched by Telegram servers
    Url(String),
    /// Local file uploaded on every send
    Path(PathBuf),
}

impl AssetRef {
    pub fn validate(&self, name: &str) -> Result<()> {
        match self {
            AssetRef::FileId(id) => {
                if id.trim().is_empty() {
                    anyhow::bail!("Asset {} has an empty file_id", name);
                }
            }
            AssetRef::Url(url) => {
                reqwest::Url::parse(url)
                    .with_context(|| format!("Asset {} has an invalid url: {}", name, url))?;
            }
            AssetRef::Path(path) => {
                if !path.is_file() {
                    anyhow::bail!("Asset {} file not found: {}", name, path.display());
                }
            }
        }
        Ok(())
    }

    pub fn to_input_file(&self) -> Result<InputFile> {
        let file = match self {
            AssetRef::FileId(id) => InputFile::file_id(FileId(id.clone())),
            AssetRef::Url(url) => {
                let url = reqwest::Url::parse(url)
                    .with_context(|| format!("Invalid asset url: {}", url))?;
                InputFile::url(url)
            }
            AssetRef::Path(path) => InputFile::file(path.clone()),
        };
        Ok(file)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Stickers {
    pub uh_ska: AssetRef,
    pub mcconaughey: AssetRef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Animations {
    pub dicaprio_congrats: AssetRef,
    pub bouncing_head_yes: AssetRef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Voices {
    pub uh_ska: AssetRef,
    pub ne_lez_ska: AssetRef,
}

/// Media the bot replies with, from the `[assets.*]` config tables
#[derive(Debug, Deserialize, Clone)]
pub struct Assets {
    pub stickers: Stickers,
    pub animations: Animations,
    pub voices: Voices,
}

impl Assets {
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("stickers.uh_ska", &self.stickers.uh_ska),
            ("stickers.mcconaughey", &self.stickers.mcconaughey),
            ("animations.dicaprio_congrats", &self.animations.dicaprio_congrats),
            ("animations.bouncing_head_yes", &self.animations.bouncing_head_yes),
            ("voices.uh_ska", &self.voices.uh_ska),
            ("voices.ne_lez_ska", &self.voices.ne_lez_ska),
        ];
        for (name, asset) in all {
            asset.validate(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_assets() -> Assets {
    let id = |s: &str| AssetRef::FileId(s.to_string());
    Assets {
        stickers: Stickers {
            uh_ska: id("sticker-uh-ska"),
            mcconaughey: id("sticker-mcconaughey"),
        },
        animations: Animations {
            dicaprio_congrats: id("animation-dicaprio"),
            bouncing_head_yes: id("animation-bouncing-head"),
        },
        voices: Voices {
            uh_ska: id("voice-uh-ska"),
            ne_lez_ska: id("voice-ne-lez-ska"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_validates() {
        assert!(AssetRef::FileId("abc".into()).validate("x").is_ok());
        assert!(AssetRef::FileId(" ".into()).validate("x").is_err());
    }

    #[test]
    fn test_url_validates() {
        assert!(AssetRef::Url("https://example.com/a.gif".into())
            .validate("x")
            .is_ok());
        let err = AssetRef::Url("not a url".into())
            .validate("animations.boy")
            .unwrap_err();
        assert!(err.to_string().contains("animations.boy"));
    }

    #[test]
    fn test_missing_path_rejected() {
        let asset = AssetRef::Path(PathBuf::from("/definitely/not/here.ogg"));
        assert!(asset.validate("voices.uh_ska").is_err());
    }

    #[test]
    fn test_existing_path_accepted() {
        let path = std::env::temp_dir().join(format!("beehive-bot-asset-{}.ogg", std::process::id()));
        std::fs::write(&path, b"OggS").unwrap();
        assert!(AssetRef::Path(path.clone()).validate("voices.uh_ska").is_ok());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_to_input_file() {
        assert!(AssetRef::FileId("abc".into()).to_input_file().is_ok());
        assert!(AssetRef::Url("https://example.com/a.gif".into())
            .to_input_file()
            .is_ok());
        assert!(AssetRef::Url("::".into()).to_input_file().is_err());
    }

    #[test]
    fn test_registry_validates_every_asset() {
        let mut assets = test_assets();
        assert!(assets.validate().is_ok());

        assets.voices.ne_lez_ska = AssetRef::FileId(String::new());
        let err = assets.validate().unwrap_err();
        assert!(err.to_string().contains("voices.ne_lez_ska"));
    }
}
