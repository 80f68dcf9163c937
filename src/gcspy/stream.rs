/*!
 * Metric Streams
 * Immutable descriptors for one telemetry channel of a space
 */

use super::space::Transmission;
use crate::core::data_structures::InlineString;
use crate::core::errors::SpyResult;
use crate::core::types::StreamId;
use serde::{Deserialize, Serialize};

/// Storage width of stream values on the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Byte,
    Short,
    Int,
}

impl ValueKind {
    /// Representable `(min, max)` for this width
    pub const fn bounds(self) -> (i64, i64) {
        match self {
            ValueKind::Byte => (i8::MIN as i64, i8::MAX as i64),
            ValueKind::Short => (i16::MIN as i64, i16::MAX as i64),
            ValueKind::Int => (i32::MIN as i64, i32::MAX as i64),
        }
    }
}

/// How the client renders a value next to its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    Plain,
    Plus,
    MaxVar,
    Percent,
    PercentVar,
    Enum,
}

/// How zero values are painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintStyle {
    Plain,
    Zero,
}

/// Colour hint for a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 200, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Descriptor for one telemetry channel
///
/// Built once with the `with_*` methods and never mutated afterwards. The
/// descriptor travels to the client inside the space metadata so it can scale
/// per-tile values against `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricStream {
    id: StreamId,
    kind: ValueKind,
    name: InlineString,
    min: i64,
    max: i64,
    zero: i64,
    default: i64,
    prefix: InlineString,
    suffix: InlineString,
    presentation: Presentation,
    paint: PaintStyle,
    color: Color,
}

impl MetricStream {
    pub fn new(id: StreamId, kind: ValueKind, name: impl Into<InlineString>) -> Self {
        let (_, kind_max) = kind.bounds();
        Self {
            id,
            kind,
            name: name.into(),
            min: 0,
            max: kind_max,
            zero: 0,
            default: 0,
            prefix: InlineString::default(),
            suffix: InlineString::default(),
            presentation: Presentation::Plain,
            paint: PaintStyle::Plain,
            color: Color::BLACK,
        }
    }

    /// Declared range, narrowed to what the value kind can hold
    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        let (lo, hi) = self.kind.bounds();
        self.min = min.clamp(lo, hi);
        self.max = max.clamp(self.min, hi);
        self
    }

    pub fn with_zero(mut self, zero: i64, default: i64) -> Self {
        self.zero = zero;
        self.default = default;
        self
    }

    pub fn with_labels(mut self, prefix: &str, suffix: &str) -> Self {
        self.prefix = prefix.into();
        self.suffix = suffix.into();
        self
    }

    pub fn with_style(mut self, presentation: Presentation, paint: PaintStyle) -> Self {
        self.presentation = presentation;
        self.paint = paint;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn id(&self) -> StreamId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn min(&self) -> i64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> i64 {
        self.max
    }

    #[inline]
    pub fn zero(&self) -> i64 {
        self.zero
    }

    #[inline]
    pub fn default_value(&self) -> i64 {
        self.default
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    #[inline]
    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    #[inline]
    pub fn paint(&self) -> PaintStyle {
        self.paint
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Cap a value into `[min, max]`, reporting whether it was changed
    #[inline]
    pub fn clamp(&self, value: i64) -> (i64, bool) {
        let clamped = value.clamp(self.min, self.max);
        (clamped, clamped != value)
    }

    /// Open the per-tile section for this stream
    pub fn begin_stream(&self, tx: &mut Transmission<'_>, tile_count: usize) -> SpyResult<()> {
        tx.begin_stream(self.id, tile_count)
    }

    /// Emit one tile value, clamped to the declared range
    ///
    /// Returns true if the value had to be clamped.
    pub fn emit_value(&self, tx: &mut Transmission<'_>, value: i64) -> SpyResult<bool> {
        let (value, clamped) = self.clamp(value);
        tx.push_value(self.id, value)?;
        Ok(clamped)
    }

    pub fn end_stream(&self, tx: &mut Transmission<'_>) -> SpyResult<()> {
        tx.end_stream(self.id)
    }

    pub fn begin_summary(&self, tx: &mut Transmission<'_>, items: usize) -> SpyResult<()> {
        tx.begin_summary(self.id, items)
    }

    /// Summary values are totals and are sent unclamped
    pub fn emit_summary_value(&self, tx: &mut Transmission<'_>, value: i64) -> SpyResult<()> {
        tx.push_value(self.id, value)
    }

    pub fn end_summary(&self, tx: &mut Transmission<'_>) -> SpyResult<()> {
        tx.end_summary(self.id)
    }
}
