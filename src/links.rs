// SPDX-License-Identifier: MPL-2.0

//! Contact links built from the phone numbers and handles stored on records.

use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

const DEFAULT_WHATSAPP_MESSAGE: &str = "Olá! Vi seu número no Guia de Telefones.";
const COUNTRY_CODE: &str = "55";

/// Characters left as-is in a URI component: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialPlatform {
    Instagram,
    Facebook,
}

/// Link that opens a WhatsApp chat with `phone`, or `None` without a number.
/// Values that already are links are passed through.
pub fn whatsapp_link(phone: &str, text: Option<&str>) -> Option<String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return None;
    }
    if phone.contains("wa.me") || phone.contains("whatsapp.com") || phone.starts_with("http") {
        return Some(phone.to_string());
    }

    let digits = NON_DIGIT.replace_all(phone, "");
    if digits.is_empty() {
        return None;
    }
    let number = if digits.starts_with(COUNTRY_CODE) {
        digits.into_owned()
    } else {
        format!("{COUNTRY_CODE}{digits}")
    };

    let message = text.unwrap_or(DEFAULT_WHATSAPP_MESSAGE);
    Some(format!(
        "https://wa.me/{number}?text={}",
        utf8_percent_encode(message, URI_COMPONENT)
    ))
}

/// Profile URL for a social handle; full URLs are kept as they are
pub fn social_url(platform: SocialPlatform, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.starts_with("http") {
        return Some(value.to_string());
    }
    Some(match platform {
        SocialPlatform::Instagram => format!("https://instagram.com/{}", value.replace('@', "")),
        SocialPlatform::Facebook => format!("https://facebook.com/{value}"),
    })
}

/// `tel:` link for the call button
pub fn phone_link(phone: &str) -> Option<String> {
    let digits = NON_DIGIT.replace_all(phone, "");
    (!digits.is_empty()).then(|| format!("tel:{digits}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whatsapp_adds_country_code() {
        let link = whatsapp_link("(14) 99888-0001", Some("Oi")).unwrap();
        assert_eq!(link, "https://wa.me/5514998880001?text=Oi");
    }

    #[test]
    fn test_whatsapp_keeps_existing_country_code() {
        let link = whatsapp_link("5514997550000", Some("Oi")).unwrap();
        assert!(link.starts_with("https://wa.me/5514997550000?"));
    }

    #[test]
    fn test_whatsapp_default_message_is_encoded() {
        let link = whatsapp_link("14 3346-1234", None).unwrap();
        assert!(link.starts_with("https://wa.me/551433461234?text="));
        assert!(link.contains("Ol%C3%A1"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn test_whatsapp_message_encodes_like_a_uri_component() {
        let link = whatsapp_link("14 3346-1234", None).unwrap();
        assert_eq!(
            link,
            "https://wa.me/551433461234?text=Ol%C3%A1!%20Vi%20seu%20n%C3%BAmero%20no%20Guia%20de%20Telefones."
        );

        let link = whatsapp_link("14 3346-1234", Some("a+b & c/d (ok)*")).unwrap();
        assert!(link.ends_with("?text=a%2Bb%20%26%20c%2Fd%20(ok)*"));
    }

    #[test]
    fn test_whatsapp_passthrough_and_empty() {
        assert_eq!(
            whatsapp_link("https://wa.me/5514000", None).as_deref(),
            Some("https://wa.me/5514000")
        );
        assert!(whatsapp_link("", None).is_none());
        assert!(whatsapp_link("sem telefone", None).is_none());
    }

    #[test]
    fn test_social_urls() {
        assert_eq!(
            social_url(SocialPlatform::Instagram, "@pizzaria_bc").as_deref(),
            Some("https://instagram.com/pizzaria_bc")
        );
        assert_eq!(
            social_url(SocialPlatform::Facebook, "pizzariaditaliabc").as_deref(),
            Some("https://facebook.com/pizzariaditaliabc")
        );
        assert_eq!(
            social_url(SocialPlatform::Facebook, "https://fb.com/x").as_deref(),
            Some("https://fb.com/x")
        );
        assert!(social_url(SocialPlatform::Instagram, " ").is_none());
    }

    #[test]
    fn test_phone_link() {
        assert_eq!(phone_link("(14) 3346-1234").as_deref(), Some("tel:1433461234"));
        assert!(phone_link("").is_none());
    }
}
