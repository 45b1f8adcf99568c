//! The WHATWG basic URL parser.
//!
//! A byte pointer walks the cleaned input through the explicit state
//! enumeration, editing a [`UrlRecord`]. Setters re-enter the machine
//! with `state_override` pointing at their component's state. Delimiter
//! scans are batched per state rather than per character.

use super::record::{PathForm, UrlRecord};
use super::state::State;
use crate::error::{ParseError, Result};
use crate::helpers::is_windows_drive_letter;
use crate::host::{HostKind, ParsedHost, parse_host};
use crate::percent::{
    C0_CONTROL_SET, FRAGMENT_SET, PATH_SET, QUERY_SET, SPECIAL_QUERY_SET, USERINFO_SET,
    percent_encode_into, percent_encode_with_set,
};
use crate::scheme::{SchemeType, is_scheme_byte, scheme_type};

/// Non-fatal signals the standard records while parsing. Only surfaced
/// through the opt-in reporter; they never change the parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Input contained code points that had to be stripped before parsing
    InvalidUrlUnit,
    /// A special scheme was not followed by `//`
    SpecialSchemeMissingFollowingSolidus,
    /// The input had no scheme and no usable base
    MissingSchemeNonRelativeUrl,
    /// `\` used as a separator in a special URL
    InvalidReverseSolidus,
    /// The authority contained an `@`
    InvalidCredentials,
    /// An authority was present but the host was empty
    HostMissing,
    /// The port was not a number in range
    PortInvalid,
    /// A Windows drive letter appeared where a host was expected
    FileInvalidWindowsDriveLetter,
    /// A file URL with a host also carried a drive-letter path
    FileInvalidWindowsDriveLetterHost,
}

pub(crate) struct Machine<'i, 'b, 'r> {
    input: &'i str,
    bytes: &'i [u8],
    base: Option<&'b UrlRecord>,
    state_override: Option<State>,
    reporter: Option<&'r mut dyn FnMut(ValidationError)>,
}

/// Run the state machine over `input`, editing `url` in place.
pub(crate) fn run(
    input: &str,
    base: Option<&UrlRecord>,
    url: &mut UrlRecord,
    state_override: Option<State>,
    reporter: Option<&mut dyn FnMut(ValidationError)>,
) -> Result<()> {
    Machine {
        input,
        bytes: input.as_bytes(),
        base,
        state_override,
        reporter,
    }
    .run(url)
}

impl<'i, 'b, 'r> Machine<'i, 'b, 'r> {
    fn report(&mut self, error: ValidationError) {
        if let Some(reporter) = self.reporter.as_mut() {
            (**reporter)(error);
        }
    }

    fn c(&self, p: usize) -> Option<char> {
        self.input.get(p..).and_then(|rest| rest.chars().next())
    }

    /// End of the authority-ish span starting at `from`: the first `/`,
    /// `?`, `#`, or (for special schemes) `\`.
    fn span_end(&self, from: usize, special: bool) -> usize {
        let mut i = from;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'/' | b'?' | b'#' => return i,
                b'\\' if special => return i,
                _ => i += 1,
            }
        }
        i
    }

    /// End of the current path segment. Under a state override, `?` and
    /// `#` lose their meaning and are percent-encoded into the path.
    fn segment_end(&self, from: usize, special: bool) -> usize {
        let mut i = from;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'/' => return i,
                b'\\' if special => return i,
                b'?' | b'#' if self.state_override.is_none() => return i,
                _ => i += 1,
            }
        }
        i
    }

    fn run(mut self, url: &mut UrlRecord) -> Result<()> {
        let mut state = self.state_override.unwrap_or(State::SchemeStart);
        let mut buffer = String::new();
        let mut p: usize = 0;

        loop {
            match state {
                State::SchemeStart => match self.c(p) {
                    Some(c) if c.is_ascii_alphabetic() => {
                        buffer.push(c.to_ascii_lowercase());
                        p += 1;
                        state = State::Scheme;
                    }
                    _ if self.state_override.is_none() => state = State::NoScheme,
                    _ => return Err(ParseError::InvalidScheme),
                },

                State::Scheme => match self.c(p) {
                    Some(c) if c.is_ascii() && is_scheme_byte(c as u8, false) => {
                        buffer.push(c.to_ascii_lowercase());
                        p += 1;
                    }
                    Some(':') => {
                        let new_type = scheme_type(&buffer);
                        if self.state_override.is_some() {
                            // A scheme change may not cross the
                            // special/non-special boundary, give file:
                            // credentials or a port, or abandon a file
                            // URL with an empty host
                            if url.scheme_type.is_special() != new_type.is_special() {
                                return Err(ParseError::InvalidScheme);
                            }
                            if new_type.is_file() && (url.has_credentials() || url.port.is_some())
                            {
                                return Err(ParseError::InvalidScheme);
                            }
                            if url.scheme_type.is_file()
                                && url
                                    .host
                                    .as_ref()
                                    .is_some_and(|h| h.serialization.is_empty())
                            {
                                return Err(ParseError::InvalidScheme);
                            }
                            url.scheme = core::mem::take(&mut buffer);
                            url.scheme_type = new_type;
                            if url.port == new_type.default_port() {
                                url.port = None;
                            }
                            return Ok(());
                        }

                        url.scheme = core::mem::take(&mut buffer);
                        url.scheme_type = new_type;
                        p += 1;

                        if new_type.is_file() {
                            if !self.input[p..].starts_with("//") {
                                self.report(
                                    ValidationError::SpecialSchemeMissingFollowingSolidus,
                                );
                            }
                            state = State::File;
                        } else if new_type.is_special() {
                            if self
                                .base
                                .is_some_and(|base| base.scheme == url.scheme)
                            {
                                state = State::SpecialRelativeOrAuthority;
                            } else {
                                state = State::SpecialAuthoritySlashes;
                            }
                        } else if self.bytes.get(p) == Some(&b'/') {
                            state = State::PathOrAuthority;
                            p += 1;
                        } else {
                            url.path = PathForm::Opaque(String::new());
                            state = State::OpaquePath;
                        }
                    }
                    _ => {
                        if self.state_override.is_some() {
                            return Err(ParseError::InvalidScheme);
                        }
                        buffer.clear();
                        state = State::NoScheme;
                        p = 0;
                    }
                },

                State::NoScheme => {
                    let Some(base) = self.base else {
                        self.report(ValidationError::MissingSchemeNonRelativeUrl);
                        return Err(ParseError::RelativeUrlWithoutBase);
                    };
                    if base.path.is_opaque() {
                        if self.c(p) != Some('#') {
                            self.report(ValidationError::MissingSchemeNonRelativeUrl);
                            return Err(ParseError::RelativeUrlWithoutBase);
                        }
                        url.scheme = base.scheme.clone();
                        url.scheme_type = base.scheme_type;
                        url.path = base.path.clone();
                        url.query = base.query.clone();
                        url.fragment = Some(String::new());
                        state = State::Fragment;
                        p += 1;
                    } else if base.scheme_type.is_file() {
                        state = State::File;
                    } else {
                        state = State::Relative;
                    }
                }

                State::SpecialRelativeOrAuthority => {
                    if self.bytes.get(p) == Some(&b'/') && self.bytes.get(p + 1) == Some(&b'/') {
                        state = State::SpecialAuthorityIgnoreSlashes;
                        p += 2;
                    } else {
                        self.report(ValidationError::SpecialSchemeMissingFollowingSolidus);
                        state = State::Relative;
                    }
                }

                State::PathOrAuthority => {
                    if self.bytes.get(p) == Some(&b'/') {
                        state = State::Authority;
                        p += 1;
                    } else {
                        state = State::Path;
                    }
                }

                State::Relative => {
                    let Some(base) = self.base else {
                        return Err(ParseError::RelativeUrlWithoutBase);
                    };
                    url.scheme = base.scheme.clone();
                    url.scheme_type = base.scheme_type;

                    match self.c(p) {
                        Some('/') => {
                            state = State::RelativeSlash;
                            p += 1;
                        }
                        Some('\\') if url.scheme_type.is_special() => {
                            self.report(ValidationError::InvalidReverseSolidus);
                            state = State::RelativeSlash;
                            p += 1;
                        }
                        c => {
                            url.username = base.username.clone();
                            url.password = base.password.clone();
                            url.host = base.host.clone();
                            url.port = base.port;
                            url.path = base.path.clone();
                            url.query = base.query.clone();
                            match c {
                                None => break,
                                Some('?') => {
                                    url.query = Some(String::new());
                                    state = State::Query;
                                    p += 1;
                                }
                                Some('#') => {
                                    url.fragment = Some(String::new());
                                    state = State::Fragment;
                                    p += 1;
                                }
                                Some(_) => {
                                    url.query = None;
                                    url.shorten_path();
                                    state = State::Path;
                                }
                            }
                        }
                    }
                }

                State::RelativeSlash => {
                    let c = self.c(p);
                    if url.scheme_type.is_special() && matches!(c, Some('/' | '\\')) {
                        if c == Some('\\') {
                            self.report(ValidationError::InvalidReverseSolidus);
                        }
                        state = State::SpecialAuthorityIgnoreSlashes;
                        p += 1;
                    } else if c == Some('/') {
                        state = State::Authority;
                        p += 1;
                    } else {
                        let Some(base) = self.base else {
                            return Err(ParseError::RelativeUrlWithoutBase);
                        };
                        url.username = base.username.clone();
                        url.password = base.password.clone();
                        url.host = base.host.clone();
                        url.port = base.port;
                        state = State::Path;
                    }
                }

                State::SpecialAuthoritySlashes => {
                    if self.bytes.get(p) == Some(&b'/') && self.bytes.get(p + 1) == Some(&b'/') {
                        p += 2;
                    } else {
                        self.report(ValidationError::SpecialSchemeMissingFollowingSolidus);
                    }
                    state = State::SpecialAuthorityIgnoreSlashes;
                }

                State::SpecialAuthorityIgnoreSlashes => {
                    if matches!(self.bytes.get(p), Some(b'/' | b'\\')) {
                        self.report(ValidationError::SpecialSchemeMissingFollowingSolidus);
                        p += 1;
                    } else {
                        state = State::Authority;
                    }
                }

                State::Authority => {
                    let special = url.scheme_type.is_special();
                    let end = self.span_end(p, special);
                    let span = &self.input[p..end];

                    if let Some(at) = span.rfind('@') {
                        self.report(ValidationError::InvalidCredentials);
                        if span[at + 1..].is_empty() {
                            self.report(ValidationError::HostMissing);
                            return Err(ParseError::InvalidHost);
                        }
                        let credentials = &span[..at];
                        // A password delimiter directly followed by a
                        // further "@" (as in "@hostname:@password:@x")
                        // leaves the user-info/host boundary ambiguous.
                        // Splitting at the last "@" would silently turn
                        // would-be hosts into password text, so this is
                        // rejected rather than guessed — deliberately
                        // stricter than splitting the way a plain
                        // last-"@"/first-":" scan would. Passwords that
                        // merely contain "@" ("user:p@ss@host") keep the
                        // usual split.
                        if credentials.contains(":@") {
                            return Err(ParseError::InvalidHost);
                        }
                        match credentials.split_once(':') {
                            Some((user, pass)) => {
                                url.username = percent_encode_with_set(user, USERINFO_SET);
                                url.password = percent_encode_with_set(pass, USERINFO_SET);
                            }
                            None => {
                                url.username =
                                    percent_encode_with_set(credentials, USERINFO_SET);
                                url.password = String::new();
                            }
                        }
                        p += at + 1;
                    }
                    state = State::Host;
                }

                State::Host | State::Hostname => {
                    if self.state_override.is_some() && url.scheme_type.is_file() {
                        state = State::FileHost;
                        continue;
                    }

                    let special = url.scheme_type.is_special();
                    let end = self.span_end(p, special);
                    let span = &self.input[p..end];

                    // The first ':' outside brackets separates the port
                    let mut inside_brackets = false;
                    let mut colon: Option<usize> = None;
                    for (i, b) in span.bytes().enumerate() {
                        match b {
                            b'[' => inside_brackets = true,
                            b']' => inside_brackets = false,
                            b':' if !inside_brackets => {
                                colon = Some(i);
                                break;
                            }
                            _ => {}
                        }
                    }

                    if let Some(colon) = colon {
                        if self.state_override == Some(State::Hostname) {
                            return Err(ParseError::InvalidHost);
                        }
                        let host_str = &span[..colon];
                        if host_str.is_empty() {
                            self.report(ValidationError::HostMissing);
                            return Err(ParseError::InvalidHost);
                        }
                        url.host = Some(parse_host(host_str, url.scheme_type)?);
                        p += colon + 1;
                        state = State::Port;
                    } else {
                        if special && span.is_empty() {
                            self.report(ValidationError::HostMissing);
                            return Err(ParseError::InvalidHost);
                        }
                        if self.state_override.is_some()
                            && span.is_empty()
                            && (url.has_credentials() || url.port.is_some())
                        {
                            return Err(ParseError::InvalidHost);
                        }
                        url.host = Some(parse_host(span, url.scheme_type)?);
                        if self.state_override.is_some() {
                            return Ok(());
                        }
                        p = end;
                        state = State::PathStart;
                    }
                }

                State::Port => {
                    let digits_start = p;
                    while self.bytes.get(p).is_some_and(u8::is_ascii_digit) {
                        p += 1;
                    }
                    let at_terminator = match self.bytes.get(p) {
                        None => true,
                        Some(b'/' | b'?' | b'#') => true,
                        Some(b'\\') if url.scheme_type.is_special() => true,
                        Some(_) => false,
                    };
                    if !at_terminator {
                        self.report(ValidationError::PortInvalid);
                        return Err(ParseError::InvalidPort);
                    }
                    let digits = &self.input[digits_start..p];
                    if !digits.is_empty() {
                        let port: u16 = digits.parse().map_err(|_| {
                            self.report(ValidationError::PortInvalid);
                            ParseError::InvalidPort
                        })?;
                        url.port = if url.scheme_type.default_port() == Some(port) {
                            None
                        } else {
                            Some(port)
                        };
                    }
                    if self.state_override.is_some() {
                        return Ok(());
                    }
                    state = State::PathStart;
                }

                State::File => {
                    url.scheme = "file".to_string();
                    url.scheme_type = SchemeType::File;
                    url.host = Some(ParsedHost {
                        serialization: String::new(),
                        kind: HostKind::Empty,
                    });

                    let c = self.c(p);
                    if matches!(c, Some('/' | '\\')) {
                        if c == Some('\\') {
                            self.report(ValidationError::InvalidReverseSolidus);
                        }
                        state = State::FileSlash;
                        p += 1;
                    } else if let Some(base) =
                        self.base.filter(|base| base.scheme_type.is_file())
                    {
                        url.host = base.host.clone();
                        url.path = base.path.clone();
                        url.query = base.query.clone();
                        match c {
                            None => break,
                            Some('?') => {
                                url.query = Some(String::new());
                                state = State::Query;
                                p += 1;
                            }
                            Some('#') => {
                                url.fragment = Some(String::new());
                                state = State::Fragment;
                                p += 1;
                            }
                            Some(_) => {
                                url.query = None;
                                if is_windows_drive_letter(self.bytes, p) {
                                    // A drive letter resets the path
                                    // instead of inheriting the base's
                                    self.report(
                                        ValidationError::FileInvalidWindowsDriveLetter,
                                    );
                                    url.path = PathForm::List(Vec::new());
                                } else {
                                    url.shorten_path();
                                }
                                state = State::Path;
                            }
                        }
                    } else {
                        state = State::Path;
                    }
                }

                State::FileSlash => {
                    let c = self.c(p);
                    if matches!(c, Some('/' | '\\')) {
                        if c == Some('\\') {
                            self.report(ValidationError::InvalidReverseSolidus);
                        }
                        state = State::FileHost;
                        p += 1;
                    } else {
                        if let Some(base) = self.base.filter(|base| base.scheme_type.is_file())
                        {
                            url.host = base.host.clone();
                            if !is_windows_drive_letter(self.bytes, p)
                                && let PathForm::List(segments) = &base.path
                                && let Some(first) = segments.first()
                                && crate::helpers::is_normalized_windows_drive_letter(first)
                                && let PathForm::List(path) = &mut url.path
                            {
                                path.push(first.clone());
                            }
                        }
                        state = State::Path;
                    }
                }

                State::FileHost => {
                    let end = self.span_end(p, true);
                    let span = &self.input[p..end];

                    if self.state_override.is_none()
                        && span.len() == 2
                        && is_windows_drive_letter(span.as_bytes(), 0)
                    {
                        // Not a host after all
                        self.report(ValidationError::FileInvalidWindowsDriveLetter);
                        state = State::Path;
                    } else if span.is_empty() {
                        url.host = Some(ParsedHost {
                            serialization: String::new(),
                            kind: HostKind::Empty,
                        });
                        if self.state_override.is_some() {
                            return Ok(());
                        }
                        state = State::PathStart;
                    } else {
                        // localhost is kept verbatim: stripping it
                        // changes meaning on some platforms
                        url.host = Some(parse_host(span, url.scheme_type)?);
                        if self.state_override.is_some() {
                            return Ok(());
                        }
                        p = end;
                        state = State::PathStart;
                    }
                }

                State::PathStart => {
                    let c = self.c(p);
                    if url.scheme_type.is_special() {
                        if c == Some('\\') {
                            self.report(ValidationError::InvalidReverseSolidus);
                        }
                        state = State::Path;
                        if matches!(c, Some('/' | '\\')) {
                            p += 1;
                        }
                    } else if c == Some('?') && self.state_override.is_none() {
                        url.query = Some(String::new());
                        state = State::Query;
                        p += 1;
                    } else if c == Some('#') && self.state_override.is_none() {
                        url.fragment = Some(String::new());
                        state = State::Fragment;
                        p += 1;
                    } else if c.is_some() {
                        state = State::Path;
                        if c == Some('/') {
                            p += 1;
                        }
                    } else {
                        if self.state_override.is_some()
                            && url.host.is_none()
                            && let PathForm::List(segments) = &mut url.path
                        {
                            segments.push(String::new());
                        }
                        break;
                    }
                }

                State::Path => {
                    let special = url.scheme_type.is_special();
                    let mut done = false;
                    loop {
                        let seg_end = self.segment_end(p, special);
                        let segment = &self.input[p..seg_end];
                        let separator = self.bytes.get(seg_end).copied();
                        let at_segment_boundary = matches!(separator, Some(b'/'))
                            || (special && matches!(separator, Some(b'\\')));

                        if is_double_dot(segment) {
                            url.shorten_path();
                            if !at_segment_boundary {
                                push_segment(url, String::new());
                            }
                        } else if is_single_dot(segment) {
                            if !at_segment_boundary {
                                push_segment(url, String::new());
                            }
                        } else if url.scheme_type.is_file()
                            && path_is_empty(url)
                            && is_drive_letter_segment(segment)
                        {
                            if url
                                .host
                                .as_ref()
                                .is_some_and(|h| !h.serialization.is_empty())
                            {
                                self.report(
                                    ValidationError::FileInvalidWindowsDriveLetterHost,
                                );
                                url.host = Some(ParsedHost {
                                    serialization: String::new(),
                                    kind: HostKind::Empty,
                                });
                            }
                            let mut normalized = String::with_capacity(2);
                            normalized.push(segment.as_bytes()[0] as char);
                            normalized.push(':');
                            push_segment(url, normalized);
                        } else {
                            let mut encoded = String::with_capacity(segment.len());
                            percent_encode_into(&mut encoded, segment, PATH_SET);
                            push_segment(url, encoded);
                        }

                        match separator {
                            Some(b'/') => p = seg_end + 1,
                            Some(b'\\') if special => {
                                self.report(ValidationError::InvalidReverseSolidus);
                                p = seg_end + 1;
                            }
                            Some(b'?') => {
                                url.query = Some(String::new());
                                state = State::Query;
                                p = seg_end + 1;
                                break;
                            }
                            Some(b'#') => {
                                url.fragment = Some(String::new());
                                state = State::Fragment;
                                p = seg_end + 1;
                                break;
                            }
                            _ => {
                                p = seg_end;
                                done = true;
                                break;
                            }
                        }
                    }
                    if done {
                        break;
                    }
                }

                State::OpaquePath => {
                    match self.c(p) {
                        None => break,
                        Some('?') => {
                            url.query = Some(String::new());
                            state = State::Query;
                            p += 1;
                        }
                        Some('#') => {
                            url.fragment = Some(String::new());
                            state = State::Fragment;
                            p += 1;
                        }
                        Some(' ') => {
                            if let PathForm::Opaque(path) = &mut url.path {
                                // Only a space directly before the query
                                // or fragment delimiter is encoded
                                if matches!(self.bytes.get(p + 1), Some(b'?' | b'#')) {
                                    path.push_str("%20");
                                } else {
                                    path.push(' ');
                                }
                            }
                            p += 1;
                        }
                        Some(c) => {
                            if let PathForm::Opaque(path) = &mut url.path {
                                let mut tmp = [0u8; 4];
                                percent_encode_into(
                                    path,
                                    c.encode_utf8(&mut tmp),
                                    C0_CONTROL_SET,
                                );
                            }
                            p += c.len_utf8();
                        }
                    }
                }

                State::Query => {
                    // Under a state override `#` loses its meaning and is
                    // percent-encoded into the query
                    let end = if self.state_override.is_some() {
                        self.bytes.len()
                    } else {
                        memchr::memchr(b'#', &self.bytes[p..])
                            .map_or(self.bytes.len(), |i| p + i)
                    };
                    let encode_set = if url.scheme_type.is_special() {
                        SPECIAL_QUERY_SET
                    } else {
                        QUERY_SET
                    };
                    let query = url.query.get_or_insert_with(String::new);
                    percent_encode_into(query, &self.input[p..end], encode_set);
                    p = end;
                    if self.bytes.get(p) == Some(&b'#') && self.state_override.is_none() {
                        url.fragment = Some(String::new());
                        state = State::Fragment;
                        p += 1;
                    } else {
                        break;
                    }
                }

                State::Fragment => {
                    let fragment = url.fragment.get_or_insert_with(String::new);
                    percent_encode_into(fragment, &self.input[p..], FRAGMENT_SET);
                    break;
                }
            }
        }

        Ok(())
    }
}

fn push_segment(url: &mut UrlRecord, segment: String) {
    if let PathForm::List(segments) = &mut url.path {
        segments.push(segment);
    }
}

fn path_is_empty(url: &UrlRecord) -> bool {
    matches!(&url.path, PathForm::List(segments) if segments.is_empty())
}

fn is_drive_letter_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && matches!(bytes[1], b':' | b'|')
}

fn is_single_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_double_dot(segment: &str) -> bool {
    segment == ".."
        || segment.eq_ignore_ascii_case(".%2e")
        || segment.eq_ignore_ascii_case("%2e.")
        || segment.eq_ignore_ascii_case("%2e%2e")
}
