//! One-shot notices carried to the next rendered page in a `flash` cookie.

use tower_cookies::{Cookie, Cookies};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "info" => Some(Self::Info),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn encode(&self) -> String {
        format!("{}|{}", self.level.as_str(), urlencoding::encode(&self.message))
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let (level, message) = raw.split_once('|')?;
        Some(Self {
            level: FlashLevel::parse(level)?,
            message: urlencoding::decode(message).ok()?.into_owned(),
        })
    }
}

pub fn set_flash(cookies: &Cookies, level: FlashLevel, message: impl Into<String>) {
    let flash = Flash {
        level,
        message: message.into(),
    };
    cookies.add(
        Cookie::build((FLASH_COOKIE, flash.encode()))
            .path("/")
            .http_only(true)
            .build(),
    );
}

pub fn flash_success(cookies: &Cookies, message: impl Into<String>) {
    set_flash(cookies, FlashLevel::Success, message);
}

pub fn flash_error(cookies: &Cookies, message: impl Into<String>) {
    set_flash(cookies, FlashLevel::Error, message);
}

/// Read and clear the pending flash message, if any.
pub fn take_flash(cookies: &Cookies) -> Option<Flash> {
    let raw = cookies.get(FLASH_COOKIE)?.value().to_string();
    cookies.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
    Flash::decode(&raw)
}
