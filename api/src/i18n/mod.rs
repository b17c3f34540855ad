//! Localized user-facing messages
//!
//! Messages are deliberately generic: none of them reveals whether a phone
//! number has a pending or past verification.

use actix_web::{http::header, HttpRequest};
use pv_shared::Language;

/// Every message the API can show to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    InvalidRequest,
    InvalidPhone,
    InvalidCodeFormat,
    CaptchaRequired,
    Cooldown,
    RateLimited,
    InvalidCode,
    /// Shared by not found, expired and locked
    CodeUnavailable,
    Internal,
    NotFound,
    CodeSent,
    Verified,
}

impl MessageKey {
    fn text(&self) -> (&'static str, &'static str) {
        match self {
            MessageKey::InvalidRequest => (
                "Invalid request data.",
                "リクエストの内容が正しくありません。",
            ),
            MessageKey::InvalidPhone => (
                "Please enter a valid mobile phone number.",
                "有効な携帯電話番号を入力してください。",
            ),
            MessageKey::InvalidCodeFormat => (
                "The verification code must be 6 digits.",
                "認証コードは6桁の数字で入力してください。",
            ),
            MessageKey::CaptchaRequired => (
                "Please complete the captcha and try again.",
                "画像認証を完了してから、もう一度お試しください。",
            ),
            MessageKey::Cooldown => (
                "Please wait before requesting another code.",
                "しばらく待ってから、再度コードをリクエストしてください。",
            ),
            MessageKey::RateLimited => (
                "Too many requests. Please try again later.",
                "リクエストが多すぎます。しばらくしてから、もう一度お試しください。",
            ),
            MessageKey::InvalidCode => (
                "The verification code is incorrect.",
                "認証コードが正しくありません。",
            ),
            MessageKey::CodeUnavailable => (
                "This verification code is no longer valid. Please request a new code.",
                "この認証コードは無効です。新しいコードをリクエストしてください。",
            ),
            MessageKey::Internal => (
                "An internal error occurred. Please try again later.",
                "内部エラーが発生しました。しばらくしてから、もう一度お試しください。",
            ),
            MessageKey::NotFound => (
                "The requested resource was not found.",
                "リクエストされたリソースが見つかりません。",
            ),
            MessageKey::CodeSent => (
                "Verification code sent. Please check your SMS.",
                "認証コードを送信しました。SMSをご確認ください。",
            ),
            MessageKey::Verified => (
                "Phone number verified.",
                "電話番号の認証が完了しました。",
            ),
        }
    }
}

/// Message text for `key` in `lang`
pub fn message(key: MessageKey, lang: Language) -> &'static str {
    let (en, ja) = key.text();
    match lang {
        Language::English => en,
        Language::Japanese => ja,
    }
}

/// Language requested through `Accept-Language`, English by default
pub fn request_language(req: &HttpRequest) -> Language {
    req.headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(Language::from_accept_language)
        .unwrap_or_default()
}
