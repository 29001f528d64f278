// Copyright (c) The junit-to-ctrf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read a JUnit report into [`JunitTestCase`] records.

use crate::{JunitTestCase, NonSuccess, ReadError, RerunKind, TestRerun};
use camino::Utf8Path;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::borrow::Cow;

static TESTSUITE_TAG: &[u8] = b"testsuite";
static TESTCASE_TAG: &[u8] = b"testcase";
static FAILURE_TAG: &[u8] = b"failure";
static ERROR_TAG: &[u8] = b"error";
static SKIPPED_TAG: &[u8] = b"skipped";
static SYSTEM_OUT_TAG: &[u8] = b"system-out";
static SYSTEM_ERR_TAG: &[u8] = b"system-err";
static STACK_TRACE_TAG: &[u8] = b"stackTrace";

/// Reads all testcases from a JUnit report held in a string.
pub fn read_str(xml: &str) -> Result<Vec<JunitTestCase>, ReadError> {
    read_bytes(xml.as_bytes())
}

/// Reads all testcases from a JUnit report held in a byte buffer.
///
/// The buffer is expected to be UTF-8. Invalid sequences are replaced with U+FFFD rather than
/// rejected.
pub fn read_bytes(xml: &[u8]) -> Result<Vec<JunitTestCase>, ReadError> {
    let mut reader = Reader::from_reader(xml);
    let mut state = ReadState::default();

    loop {
        let event = reader.read_event().map_err(|error| ReadError::Xml {
            path: None,
            position: reader.buffer_position(),
            error,
        })?;
        let res = match event {
            Event::Start(start) => state.start(&start),
            Event::Empty(start) => state.start(&start).map(|()| state.end()),
            Event::End(_) => {
                state.end();
                Ok(())
            }
            Event::Text(text) => {
                state.text(&decode_text(&text));
                Ok(())
            }
            Event::CData(cdata) => {
                state.text(&String::from_utf8_lossy(&cdata));
                Ok(())
            }
            Event::Eof => break,
            _ => Ok(()),
        };
        res.map_err(|error| ReadError::Xml {
            path: None,
            position: reader.buffer_position(),
            error,
        })?;
    }

    if let Some(open) = state.stack.last() {
        return Err(ReadError::Truncated {
            path: None,
            element: open.name.clone(),
        });
    }

    Ok(state.cases)
}

/// Reads all testcases from the JUnit report at `path`.
pub fn read_file(path: &Utf8Path) -> Result<Vec<JunitTestCase>, ReadError> {
    let bytes = std::fs::read(path).map_err(|error| ReadError::Io {
        path: path.to_owned(),
        error,
    })?;
    let cases = read_bytes(&bytes).map_err(|error| error.with_path(path))?;
    tracing::debug!("read {} test cases from `{}`", cases.len(), path);
    Ok(cases)
}

#[derive(Debug, Default)]
struct ReadState {
    stack: Vec<OpenElement>,
    cases: Vec<JunitTestCase>,
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    frame: Frame,
}

#[derive(Debug)]
enum Frame {
    Suite(Option<String>),
    Case(JunitTestCase),
    NonSuccess {
        is_error: bool,
        element: NonSuccess,
        text: String,
    },
    // <skipped> carries no data we keep, but marks the enclosing case.
    Skipped,
    CaseOutput {
        stream: Stream,
        text: String,
    },
    Rerun {
        rerun: TestRerun,
        text: String,
    },
    RerunField {
        field: RerunField,
        text: String,
    },
    Other,
}

#[derive(Copy, Clone, Debug)]
enum Stream {
    Out,
    Err,
}

#[derive(Copy, Clone, Debug)]
enum RerunField {
    StackTrace,
    Output(Stream),
}

impl ReadState {
    fn start(&mut self, start: &BytesStart<'_>) -> Result<(), quick_xml::Error> {
        let local_name = start.local_name();
        let tag = local_name.as_ref();
        let in_case = self
            .stack
            .iter()
            .any(|open| matches!(open.frame, Frame::Case(_)));

        let frame = match self.stack.last().map(|open| &open.frame) {
            Some(Frame::Case(_)) => self.case_child(tag, start)?,
            Some(Frame::Rerun { .. }) => Self::rerun_child(tag),
            _ if in_case => Frame::Other,
            _ if tag == TESTSUITE_TAG => {
                let mut name = None;
                for_each_attribute(start, |key, value| {
                    if key == b"name" {
                        name = Some(value);
                    }
                })?;
                Frame::Suite(name)
            }
            _ if tag == TESTCASE_TAG => Frame::Case(self.new_case(start)?),
            _ => Frame::Other,
        };

        self.stack.push(OpenElement {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            frame,
        });
        Ok(())
    }

    fn new_case(&self, start: &BytesStart<'_>) -> Result<JunitTestCase, quick_xml::Error> {
        let mut case = JunitTestCase {
            suite_name: self.innermost_suite_name(),
            ..JunitTestCase::default()
        };
        for_each_attribute(start, |key, value| match key {
            b"name" => case.name = Some(value),
            b"classname" => case.classname = Some(value),
            b"time" => case.time = Some(value),
            b"file" => case.file = Some(value),
            b"line" => match value.trim().parse::<u64>() {
                Ok(line) => case.line = Some(line),
                Err(_) => tracing::debug!("ignoring non-numeric line attribute `{}`", value),
            },
            _ => {}
        })?;
        Ok(case)
    }

    fn case_child(&self, tag: &[u8], start: &BytesStart<'_>) -> Result<Frame, quick_xml::Error> {
        let frame = if tag == FAILURE_TAG || tag == ERROR_TAG {
            let mut element = NonSuccess::new();
            for_each_attribute(start, |key, value| match key {
                b"message" => element.message = Some(value),
                b"type" => element.ty = Some(value),
                _ => {}
            })?;
            Frame::NonSuccess {
                is_error: tag == ERROR_TAG,
                element,
                text: String::new(),
            }
        } else if tag == SKIPPED_TAG {
            Frame::Skipped
        } else if tag == SYSTEM_OUT_TAG {
            Frame::CaseOutput {
                stream: Stream::Out,
                text: String::new(),
            }
        } else if tag == SYSTEM_ERR_TAG {
            Frame::CaseOutput {
                stream: Stream::Err,
                text: String::new(),
            }
        } else if let Some(kind) = RerunKind::from_tag_name(tag) {
            let mut rerun = TestRerun::new(kind);
            for_each_attribute(start, |key, value| match key {
                b"message" => rerun.message = Some(value),
                b"type" => rerun.ty = Some(value),
                _ => {}
            })?;
            Frame::Rerun {
                rerun,
                text: String::new(),
            }
        } else {
            Frame::Other
        };
        Ok(frame)
    }

    fn rerun_child(tag: &[u8]) -> Frame {
        let field = if tag == STACK_TRACE_TAG {
            RerunField::StackTrace
        } else if tag == SYSTEM_OUT_TAG {
            RerunField::Output(Stream::Out)
        } else if tag == SYSTEM_ERR_TAG {
            RerunField::Output(Stream::Err)
        } else {
            return Frame::Other;
        };
        Frame::RerunField {
            field,
            text: String::new(),
        }
    }

    fn text(&mut self, new_text: &str) {
        match self.stack.last_mut().map(|open| &mut open.frame) {
            Some(
                Frame::NonSuccess { text, .. }
                | Frame::CaseOutput { text, .. }
                | Frame::Rerun { text, .. }
                | Frame::RerunField { text, .. },
            ) => text.push_str(new_text),
            _ => {}
        }
    }

    fn end(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let parent = self.stack.last_mut().map(|open| &mut open.frame);

        match (open.frame, parent) {
            (Frame::Case(case), _) => self.cases.push(case),
            (
                Frame::NonSuccess {
                    is_error,
                    mut element,
                    text,
                },
                Some(Frame::Case(case)),
            ) => {
                if !text.is_empty() {
                    element.trace = Some(text);
                }
                if is_error {
                    case.error = Some(element);
                } else {
                    case.failure = Some(element);
                }
            }
            (Frame::Skipped, Some(Frame::Case(case))) => case.skipped = true,
            (Frame::CaseOutput { stream, text }, Some(Frame::Case(case))) => {
                let slot = match stream {
                    Stream::Out => &mut case.system_out,
                    Stream::Err => &mut case.system_err,
                };
                append_output(slot, text);
            }
            (Frame::Rerun { mut rerun, text }, Some(Frame::Case(case))) => {
                if rerun.stack_trace.is_none() && !text.trim().is_empty() {
                    rerun.stack_trace = Some(text);
                }
                case.add_rerun(rerun);
            }
            (Frame::RerunField { field, text }, Some(Frame::Rerun { rerun, .. })) => {
                let slot = match field {
                    RerunField::StackTrace => &mut rerun.stack_trace,
                    RerunField::Output(Stream::Out) => &mut rerun.system_out,
                    RerunField::Output(Stream::Err) => &mut rerun.system_err,
                };
                append_output(slot, text);
            }
            _ => {}
        }
    }

    fn innermost_suite_name(&self) -> Option<String> {
        self.stack.iter().rev().find_map(|open| match &open.frame {
            Frame::Suite(name) => Some(name.clone()),
            _ => None,
        })?
    }
}

fn append_output(slot: &mut Option<String>, text: String) {
    if text.is_empty() {
        return;
    }
    match slot {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(&text);
        }
        None => *slot = Some(text),
    }
}

fn for_each_attribute(
    start: &BytesStart<'_>,
    mut f: impl FnMut(&[u8], String),
) -> Result<(), quick_xml::Error> {
    for attr in start.attributes().with_checks(false) {
        let attr = attr?;
        f(attr.key.local_name().as_ref(), decode_text(&attr.value));
    }
    Ok(())
}

fn decode_text(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    unescape_lenient(&text).into_owned()
}

/// Resolves the predefined XML entities and numeric character references in `text`.
///
/// Character references to surrogates or out-of-range code points resolve to U+FFFD. Anything
/// that does not look like a reference is kept verbatim.
fn unescape_lenient(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let resolved = after
            .find(';')
            .and_then(|semi| resolve_reference(&after[..semi]).map(|c| (semi, c)));
        match resolved {
            Some((semi, c)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn resolve_reference(reference: &str) -> Option<char> {
    match reference {
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "amp" => return Some('&'),
        "apos" => return Some('\''),
        "quot" => return Some('"'),
        _ => {}
    }

    let number = reference.strip_prefix('#')?;
    let (digits, radix) = match number.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16),
        None => (number, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let c = u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    Some(c)
}
