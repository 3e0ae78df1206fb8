/*
** This file is a part of Markup (incremental XML subset parser)
** Copyright (C) 2000-2025 Gurer Ozen
**
** Markup is free software: you can redistribute it and/or modify it
** under the terms of the GNU Lesser General Public License as
** published by the Free Software Foundation, either version 3 of
** the License, or (at your option) any later version.
*/

//! Codepoint boundary helpers for raw input chunks.
//!
//! None of these functions look outside the given slice, even when the
//! bytes are not valid UTF-8.

/// Longest possible UTF-8 encoded character.
pub const MAX_SEQUENCE_LEN: usize = 4;

pub fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

/// Returns the length of the sequence started by the given lead byte.
///
/// Continuation bytes and bytes which can never start a valid sequence
/// (0xc0, 0xc1, 0xf5 and above) return `None`.
pub fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

/// Finds the start of the character which ends right before `end`.
///
/// At most [MAX_SEQUENCE_LEN] bytes are examined. Returns `None` if no
/// lead byte is found in that window.
pub fn prev_char_start(bytes: &[u8], end: usize) -> Option<usize> {
    let end = end.min(bytes.len());
    let lower = end.saturating_sub(MAX_SEQUENCE_LEN);
    (lower..end).rev().find(|&i| !is_continuation(bytes[i]))
}

/// Length of the prefix which does not end with an incomplete sequence.
///
/// Only a trailing lead byte whose sequence needs more bytes than the slice
/// has is cut off. Everything else, including garbage, is left for
/// [validate] to judge.
pub fn complete_prefix_len(bytes: &[u8]) -> usize {
    let start = match prev_char_start(bytes, bytes.len()) {
        Some(start) => start,
        None => return bytes.len(),
    };
    match sequence_len(bytes[start]) {
        Some(len) if start + len > bytes.len() => start,
        _ => bytes.len(),
    }
}

/// Validates the bytes as UTF-8.
///
/// On failure the longest valid prefix is returned as the error, so the
/// caller can account for the consumed text before reporting.
pub fn validate(bytes: &[u8]) -> Result<&str, &str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => Err(std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default()),
    }
}
