// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Mutex;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::error::NotifyError;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").expect("static regex"));

pub const DEFAULT_COUNTRY_CODE: &str = "55";

/// Delivers client-facing messages. Delivery is best effort: callers log
/// failures and carry on.
pub trait NotificationGateway {
    fn notify(&self, phone: &str, message: &str) -> Result<(), NotifyError>;
}

pub fn confirmation_message(client_name: &str, start: NaiveDateTime) -> String {
    format!(
        "Hello {}! This is the barbershop. Your appointment on {} at {} is confirmed. Let us know if you have any questions!",
        client_name,
        start.format("%d/%m/%Y"),
        start.format("%H:%M"),
    )
}

pub fn phone_digits(phone: &str) -> String {
    NON_DIGIT.replace_all(phone, "").into_owned()
}

/// `https://wa.me/<cc><digits>?text=<message>`; `None` when the phone has no digits.
pub fn messaging_link(country_code: &str, phone: &str, message: &str) -> Option<String> {
    let digits = phone_digits(phone);
    if digits.is_empty() {
        return None;
    }
    Some(format!(
        "https://wa.me/{}{}?text={}",
        phone_digits(country_code),
        digits,
        encode_component(message)
    ))
}

/// Everything `encodeURIComponent` escapes.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Emits the messaging link through `tracing` instead of sending anything.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    pub country_code: String,
}

impl Default for LogNotifier {
    fn default() -> Self {
        LogNotifier {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl NotificationGateway for LogNotifier {
    fn notify(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        let link = messaging_link(&self.country_code, phone, message)
            .ok_or_else(|| NotifyError::InvalidPhone(phone.to_string()))?;
        tracing::info!(%link, "client notification ready");
        Ok(())
    }
}

/// Keeps every message it is asked to deliver.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose every delivery fails.
    pub fn failing() -> Self {
        RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

impl NotificationGateway for RecordingNotifier {
    fn notify(&self, phone: &str, message: &str) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((phone.to_string(), message.to_string()));
        }
        if self.fail {
            return Err(NotifyError::Delivery("recording notifier set to fail".into()));
        }
        Ok(())
    }
}
