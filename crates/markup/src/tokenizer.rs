//! Tolerant SAX-style HTML tokenizer.
//!
//! A single-pass state machine that accepts arbitrary, possibly malformed,
//! markup fragments (pasted content included) and delivers structural events
//! to a [`ParseSink`]. It is lenient about attribute quoting styles and
//! unknown `<!…>` escape bodies, and strict about tag termination: a missing
//! `>` on an opening or closing tag aborts the scan with a [`ParseError`].
//!
//! Known limitations (intentional):
//! - No entity decoding; text and attribute values pass through verbatim.
//! - No rawtext modes; `<script>`/`<style>` bodies tokenize like any markup.
//! - Lookback is bounded to the explicit unscan of a just-peeked byte.

use crate::error::ParseError;
use crate::scan::Scanner;

/// Tags that imply their own close event even without an explicit `/`.
pub const SELF_CLOSING_TAGS: [&str; 10] = [
    "BR", "AREA", "LINK", "IMG", "PARAM", "HR", "INPUT", "COL", "BASE", "META",
];

pub fn is_self_closing_tag(name: &str) -> bool {
    SELF_CLOSING_TAGS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Receiver for tokenizer events.
///
/// Tag and attribute names arrive verbatim; canonicalization is the tree
/// builder's concern. `cdata` forwards to `text` unless overridden, and
/// `should_halt` lets a sink stop the scan cooperatively after any event.
pub trait ParseSink {
    fn open(&mut self, tag: &str, attributes: Vec<(String, String)>);
    fn close(&mut self, tag: &str);
    fn text(&mut self, data: &str);

    fn cdata(&mut self, data: &str) {
        self.text(data);
    }

    fn comment(&mut self, _data: &str) {}

    fn should_halt(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Starting,
    Tag,
    OpeningTag,
    ClosingTag,
    Escape,
    ProcessingInstruction,
}

/// Runs the tokenizer over `text`, delivering events to `sink`.
///
/// Events delivered before an error form the valid prefix of the input; the
/// scan stops at the first fatal error or when the sink halts it.
pub fn parse(text: &str, sink: &mut impl ParseSink) -> Result<(), ParseError> {
    let mut scanner = Scanner::new(text);
    let mut state = State::Starting;

    while !scanner.at_end() && !sink.should_halt() {
        state = match state {
            State::Starting => starting(&mut scanner, sink),
            State::Tag => tag(&mut scanner),
            State::OpeningTag => opening_tag(&mut scanner, sink)?,
            State::ClosingTag => closing_tag(&mut scanner, sink)?,
            State::Escape => escape(&mut scanner, sink),
            State::ProcessingInstruction => processing_instruction(&mut scanner),
        };
    }
    Ok(())
}

fn starting(scanner: &mut Scanner<'_>, sink: &mut impl ParseSink) -> State {
    let text = scanner.scan_until_byte(b'<');
    if !text.is_empty() {
        sink.text(text);
    }
    scanner.advance(1); // past the '<'
    State::Tag
}

fn tag(scanner: &mut Scanner<'_>) -> State {
    match scanner.scan_byte() {
        Some(b'/') => State::ClosingTag,
        Some(b'?') => State::ProcessingInstruction,
        Some(b'!') => State::Escape,
        Some(_) => {
            scanner.unscan(1);
            State::OpeningTag
        }
        None => State::Starting,
    }
}

const NAME_STOPS: &[u8] = b"/> \n\r\t";
const ATTRIBUTE_NAME_STOPS: &[u8] = b"=/> \n\r\t";

fn opening_tag(
    scanner: &mut Scanner<'_>,
    sink: &mut impl ParseSink,
) -> Result<State, ParseError> {
    let tag = scanner.scan_until_any(NAME_STOPS);
    if tag.is_empty() {
        return Ok(State::Starting);
    }

    let attributes = scan_attributes(scanner);
    log::trace!(target: "markup.tokenizer", "open tag: {tag} ({} attributes)", attributes.len());
    sink.open(tag, attributes);

    let mut terminator = scanner.scan_byte();
    if terminator == Some(b'/') {
        // Self-closing tag (XML-style).
        sink.close(tag);
        scanner.skip_whitespace();
        terminator = scanner.scan_byte();
    } else if is_self_closing_tag(tag) {
        // Self-closing tag (known HTML tag).
        sink.close(tag);
    }

    if terminator != Some(b'>') {
        return Err(ParseError::UnterminatedOpeningTag {
            position: scanner.position(),
        });
    }
    Ok(State::Starting)
}

fn scan_attributes(scanner: &mut Scanner<'_>) -> Vec<(String, String)> {
    let mut attributes = Vec::new();

    loop {
        scanner.skip_whitespace();
        let name = scanner.scan_until_any(ATTRIBUTE_NAME_STOPS);
        if name.is_empty() {
            break;
        }

        scanner.skip_whitespace();
        let value = match scanner.scan_byte() {
            Some(b'=') => {
                // Value provided; figure out what (if any) quoting style is
                // in use.
                scanner.skip_whitespace();
                match scanner.scan_byte() {
                    Some(quote @ (b'"' | b'\'')) => {
                        let value = scanner.scan_until_byte(quote);
                        scanner.advance(1); // skip over the closer
                        value.to_string()
                    }
                    Some(_) => {
                        scanner.unscan(1);
                        scanner.scan_until_any(NAME_STOPS).to_string()
                    }
                    None => String::new(),
                }
            }
            Some(_) => {
                // Value implied (e.g. in `<option selected>`).
                scanner.unscan(1);
                name.to_string()
            }
            None => name.to_string(),
        };

        attributes.push((name.to_string(), value));
    }

    attributes
}

fn closing_tag(
    scanner: &mut Scanner<'_>,
    sink: &mut impl ParseSink,
) -> Result<State, ParseError> {
    let tag = scanner.scan_until_any(b"/>");
    if tag.is_empty() {
        return Ok(State::Starting);
    }

    match scanner.scan_byte() {
        Some(b'>') => {}
        Some(b'/') => {
            // XML-style self-closing redundancy on a closing tag is
            // tolerated, but the '>' is still required.
            if scanner.scan_byte() != Some(b'>') {
                return Err(ParseError::UnterminatedClosingTag {
                    position: scanner.position(),
                });
            }
        }
        _ => {
            return Err(ParseError::UnterminatedClosingTag {
                position: scanner.position(),
            });
        }
    }

    sink.close(tag);
    Ok(State::Starting)
}

fn escape(scanner: &mut Scanner<'_>, sink: &mut impl ParseSink) -> State {
    if scanner.expect("--") {
        let data = scanner.scan_until_str("-->");
        if !data.is_empty() {
            sink.comment(data);
        }
        scanner.advance(2);
    } else if scanner.expect("[CDATA[") {
        let data = scanner.scan_until_str("]]>");
        if !data.is_empty() {
            sink.cdata(data);
        }
        scanner.advance(2);
    } else {
        // Unrecognized <!…> construct (doctype and friends): skip silently.
        scanner.scan_until_byte(b'>');
    }

    scanner.advance(1);
    State::Starting
}

fn processing_instruction(scanner: &mut Scanner<'_>) -> State {
    scanner.scan_until_str("?>");
    scanner.advance(2);
    State::Starting
}
