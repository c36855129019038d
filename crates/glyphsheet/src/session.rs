//! Interactive corner picking.
//!
//! A windowing front end reports raw pointer callbacks as
//! `(event_code, x, y, flags)` and key presses as integer codes. Both are
//! decoded once, at the boundary, into [`PointerEvent`] / [`KeyEvent`]. A
//! [`PointerSession`] latches button and modifier state between polls, and
//! [`ClickCollector`] turns a stream of [`InputEvent`]s into the four page
//! corners (or a skip / quit request).

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;

use glyphsheet_core::Quad;
use image::RgbImage;
use log::{debug, info};

use crate::{CorrespondenceSource, PointRequest, RunError};

const FLAG_COMMAND: i32 = 8;
const FLAG_SHIFT: i32 = 16;
const FLAG_OPTION: i32 = 32;

const KEY_ESCAPE: i32 = 27;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Move,
    Down,
    Up,
    DoubleClick,
}

/// Modifier keys held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub command: bool,
    pub shift: bool,
    /// Option on macOS, Alt elsewhere.
    pub option: bool,
}

impl Modifiers {
    pub fn from_flags(flags: i32) -> Self {
        Self {
            command: flags & FLAG_COMMAND != 0,
            shift: flags & FLAG_SHIFT != 0,
            option: flags & FLAG_OPTION != 0,
        }
    }

    #[inline]
    pub fn alt(&self) -> bool {
        self.option
    }

    fn latch(&mut self, other: Modifiers) {
        self.command |= other.command;
        self.shift |= other.shift;
        self.option |= other.option;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerAction,
    /// `None` for plain moves.
    pub button: Option<MouseButton>,
    pub modifiers: Modifiers,
    pub x: i32,
    pub y: i32,
}

impl PointerEvent {
    /// Decode a raw callback.
    ///
    /// Codes: `0` move; `1..=3` left/right/middle down; `4..=6` up;
    /// `7..=9` double-click. Flag bits: `8` command, `16` shift,
    /// `32` option/alt.
    pub fn decode(event_code: i32, x: i32, y: i32, flags: i32) -> Result<Self, RunError> {
        use MouseButton::*;
        use PointerAction::*;

        let (kind, button) = match event_code {
            0 => (Move, None),
            1 => (Down, Some(Left)),
            2 => (Down, Some(Right)),
            3 => (Down, Some(Middle)),
            4 => (Up, Some(Left)),
            5 => (Up, Some(Right)),
            6 => (Up, Some(Middle)),
            7 => (DoubleClick, Some(Left)),
            8 => (DoubleClick, Some(Right)),
            9 => (DoubleClick, Some(Middle)),
            other => return Err(RunError::UnknownPointerEvent(other)),
        };
        Ok(Self {
            kind,
            button,
            modifiers: Modifiers::from_flags(flags),
            x,
            y,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Escape,
    Char(char),
    Other(i32),
}

impl KeyEvent {
    pub fn from_code(code: i32) -> Self {
        if code == KEY_ESCAPE {
            return KeyEvent::Escape;
        }
        match u32::try_from(code).ok().and_then(char::from_u32) {
            Some(c) => KeyEvent::Char(c),
            None => KeyEvent::Other(code),
        }
    }

    #[inline]
    pub fn is_quit(&self) -> bool {
        matches!(self, KeyEvent::Char('q' | 'Q'))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

/// Latched pointer state between two polls.
///
/// Every dispatched event updates the coordinate; button transitions and
/// modifiers stay set until [`clear`](Self::clear).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerSession {
    x: i32,
    y: i32,
    modifiers: Modifiers,
    down: [bool; 3],
    up: [bool; 3],
    double_click: [bool; 3],
}

impl PointerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, event: &PointerEvent) {
        self.x = event.x;
        self.y = event.y;
        self.modifiers.latch(event.modifiers);

        let Some(button) = event.button else {
            return;
        };
        let i = button.index();
        match event.kind {
            PointerAction::Move => {}
            PointerAction::Down => self.down[i] = true,
            PointerAction::Up => self.up[i] = true,
            PointerAction::DoubleClick => self.double_click[i] = true,
        }
    }

    /// Reset latched buttons and modifiers; the coordinate is kept.
    pub fn clear(&mut self) {
        *self = Self {
            x: self.x,
            y: self.y,
            ..Self::default()
        };
    }

    #[inline]
    pub fn coordinate(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.down[button.index()]
    }

    pub fn is_up(&self, button: MouseButton) -> bool {
        self.up[button.index()]
    }

    pub fn is_double_click(&self, button: MouseButton) -> bool {
        self.double_click[button.index()]
    }

    pub fn left_down(&self) -> bool {
        self.is_down(MouseButton::Left)
    }

    pub fn right_down(&self) -> bool {
        self.is_down(MouseButton::Right)
    }

    pub fn middle_down(&self) -> bool {
        self.is_down(MouseButton::Middle)
    }
}

/// Blocking source of user input for one page at a time.
pub trait EventFeed {
    /// Called once per page before events are pulled.
    fn present(&mut self, _page: &RgbImage, _sample: u32) {}

    /// Next event, blocking until one arrives. `None` once input is exhausted.
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// Collects four left clicks per page, clockwise from the upper left.
///
/// `Esc` skips the page, `q` / `Q` quits the run.
pub struct ClickCollector<F> {
    feed: F,
    session: PointerSession,
}

impl<F: EventFeed> ClickCollector<F> {
    pub fn new(feed: F) -> Self {
        Self {
            feed,
            session: PointerSession::new(),
        }
    }

    pub fn session(&self) -> &PointerSession {
        &self.session
    }

    pub fn into_feed(self) -> F {
        self.feed
    }
}

impl<F: EventFeed> CorrespondenceSource for ClickCollector<F> {
    fn request_points(&mut self, page: &RgbImage, sample: u32) -> Result<PointRequest, RunError> {
        self.session.clear();
        self.feed.present(page, sample);
        info!("Sample {sample:03}: select the four page corners clockwise from the upper left");

        let mut picked: Vec<(f64, f64)> = Vec::with_capacity(4);
        loop {
            match self.feed.next_event() {
                None => return Err(RunError::FeedClosed { sample }),
                Some(InputEvent::Key(KeyEvent::Escape)) => return Ok(PointRequest::Skip),
                Some(InputEvent::Key(key)) if key.is_quit() => return Ok(PointRequest::Quit),
                Some(InputEvent::Key(_)) => {}
                Some(InputEvent::Pointer(event)) => {
                    self.session.dispatch(&event);
                    if self.session.left_down() {
                        let (x, y) = self.session.coordinate();
                        debug!("corner {} at ({x}, {y})", picked.len() + 1);
                        picked.push((x as f64, y as f64));
                        self.session.clear();
                    }
                }
            }

            if let [ul, ur, lr, ll] = picked[..] {
                return Ok(PointRequest::Points(Quad::from_clockwise([ul, ur, lr, ll])));
            }
        }
    }
}

/// Pre-recorded input, one event per line.
///
/// ```text
/// # comment
/// mouse <event_code> <x> <y> <flags>
/// key <key_code>
/// ```
///
/// Lets a capture made elsewhere drive a [`ClickCollector`] unattended.
#[derive(Clone, Debug, Default)]
pub struct EventTranscript {
    events: VecDeque<InputEvent>,
}

impl EventTranscript {
    pub fn parse(text: &str) -> Result<Self, RunError> {
        let mut events = VecDeque::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            events.push_back(parse_line(line).map_err(|e| match e {
                LineError::Pointer(code) => RunError::UnknownPointerEvent(code),
                LineError::Syntax(message) => RunError::Transcript {
                    line: i + 1,
                    message,
                },
            })?);
        }
        Ok(Self { events })
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, RunError> {
        let mut text = String::new();
        for line in reader.lines() {
            let line = line.map_err(RunError::io(Path::new("<transcript>")))?;
            text.push_str(&line);
            text.push('\n');
        }
        Self::parse(&text)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventFeed for EventTranscript {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

enum LineError {
    Pointer(i32),
    Syntax(String),
}

fn parse_line(line: &str) -> Result<InputEvent, LineError> {
    let mut fields = line.split_whitespace();
    let kind = fields.next().unwrap_or_default();
    let numbers = fields
        .map(|f| {
            f.parse::<i32>()
                .map_err(|_| LineError::Syntax(format!("`{f}` is not an integer")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match (kind, numbers.as_slice()) {
        ("mouse", &[code, x, y, flags]) => PointerEvent::decode(code, x, y, flags)
            .map(InputEvent::Pointer)
            .map_err(|_| LineError::Pointer(code)),
        ("key", &[code]) => Ok(InputEvent::Key(KeyEvent::from_code(code))),
        ("mouse", _) => Err(LineError::Syntax(
            "expected `mouse <event_code> <x> <y> <flags>`".into(),
        )),
        ("key", _) => Err(LineError::Syntax("expected `key <key_code>`".into())),
        (other, _) => Err(LineError::Syntax(format!("unknown event kind `{other}`"))),
    }
}
