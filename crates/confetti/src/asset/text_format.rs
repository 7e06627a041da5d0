//! Line-oriented `key: value` format for emitters and effects.
//!
//! An emitter is written as its name on the first line followed by one
//! `- Title -` section per attribute in a fixed order. Optional attributes
//! start with an `active:` line and omit their remaining fields when
//! inactive. Emitters of an effect are separated by a blank line.
//!
//! Loading is strict: every section title and key is checked, and any
//! mismatch aborts with a [`FormatError`] carrying the 1-based line number.
//! Nothing is returned for a partially read input.

use std::fmt::{self, Write};
use std::str::FromStr;

use thiserror::Error;

use crate::config::{EmitterConfig, EmitterOptions, ParticleCount};
use crate::curve::AttributeCurve;
use crate::error::ConfigError;
use crate::gradient::GradientCurve;
use crate::spawn::{EllipseSide, SpawnShape, SpawnShapeValue};
use crate::value::{Range, RangedValue, ScaledValue};

/// Errors raised while reading the text format.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// The input ended before the named field or section.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What was expected next.
        expected: String,
    },
    /// A section title did not match.
    #[error("line {line}: expected section \"- {expected} -\", found \"{found}\"")]
    UnexpectedSection {
        line: usize,
        expected: &'static str,
        found: String,
    },
    /// A field key did not match.
    #[error("line {line}: expected key \"{expected}\", found \"{found}\"")]
    UnexpectedKey {
        line: usize,
        expected: String,
        found: String,
    },
    /// A field line has no `:` separator.
    #[error("line {line}: expected \"{key}: <value>\"")]
    MissingSeparator { line: usize, key: String },
    /// A field value could not be parsed.
    #[error("line {line}: invalid value \"{value}\" for \"{key}\"")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
    },
    /// Input continues after a single emitter was read.
    #[error("line {line}: unexpected content after the emitter: \"{found}\"")]
    TrailingContent { line: usize, found: String },
    /// A field parsed but describes an invalid configuration.
    #[error("line {line}: {source}")]
    InvalidConfig {
        line: usize,
        #[source]
        source: ConfigError,
    },
    /// The emitter read as a whole is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

const OPTIONAL: bool = false;
const REQUIRED: bool = true;

const FIRST_SECTION: &str = "Delay";

/// Writes one emitter.
pub fn save_emitter(config: &EmitterConfig) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_emitter(&mut out, config);
    out
}

/// Writes several emitters separated by blank lines.
pub fn save_effect(configs: &[EmitterConfig]) -> String {
    let mut out = String::new();
    for (index, config) in configs.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = write_emitter(&mut out, config);
    }
    out
}

/// Reads one emitter. Trailing blank lines are allowed, anything else is not.
pub fn load_emitter(text: &str) -> Result<EmitterConfig, FormatError> {
    let mut reader = LineReader::new(text);
    let config = read_emitter(&mut reader)?;
    reader.skip_blank();
    if let Some((line, found)) = reader.peek() {
        return Err(FormatError::TrailingContent {
            line,
            found: found.to_string(),
        });
    }
    Ok(config)
}

/// Reads every emitter of an effect.
pub fn load_effect(text: &str) -> Result<Vec<EmitterConfig>, FormatError> {
    let mut reader = LineReader::new(text);
    let mut configs = Vec::new();
    loop {
        reader.skip_separators();
        if reader.peek().is_none() {
            return Ok(configs);
        }
        configs.push(read_emitter(&mut reader)?);
    }
}

fn write_emitter(out: &mut String, config: &EmitterConfig) -> fmt::Result {
    writeln!(out, "{}", config.name)?;
    section(out, "Delay")?;
    write_ranged(out, &config.delay, OPTIONAL)?;
    section(out, "Duration")?;
    write_ranged(out, &config.duration, REQUIRED)?;
    section(out, "Count")?;
    writeln!(out, "min: {}", config.count.min)?;
    writeln!(out, "max: {}", config.count.max)?;
    section(out, "Emission")?;
    write_scaled(out, &config.emission, REQUIRED, false)?;
    section(out, "Life")?;
    write_scaled(out, &config.life, REQUIRED, true)?;
    section(out, "Life Offset")?;
    write_scaled(out, &config.life_offset, OPTIONAL, true)?;
    section(out, "X Offset")?;
    write_ranged(out, &config.x_offset, OPTIONAL)?;
    section(out, "Y Offset")?;
    write_ranged(out, &config.y_offset, OPTIONAL)?;
    section(out, "Spawn Shape")?;
    write_spawn_shape(out, &config.spawn_shape)?;
    section(out, "Spawn Width")?;
    write_scaled(out, &config.spawn_width, REQUIRED, false)?;
    section(out, "Spawn Height")?;
    write_scaled(out, &config.spawn_height, REQUIRED, false)?;
    section(out, "Size")?;
    write_scaled(out, &config.size, REQUIRED, false)?;
    section(out, "Speed")?;
    write_scaled(out, &config.speed, OPTIONAL, false)?;
    section(out, "Direction")?;
    write_scaled(out, &config.direction, OPTIONAL, false)?;
    section(out, "Rotation")?;
    write_scaled(out, &config.rotation, OPTIONAL, false)?;
    section(out, "Wind")?;
    write_scaled(out, &config.wind, OPTIONAL, false)?;
    section(out, "Gravity")?;
    write_scaled(out, &config.gravity, OPTIONAL, false)?;
    section(out, "Tint")?;
    write_gradient(out, &config.tint)?;
    section(out, "Opacity")?;
    write_scaled(out, &config.opacity, REQUIRED, false)?;
    section(out, "Options")?;
    let options = &config.options;
    writeln!(out, "attached: {}", options.attached)?;
    writeln!(out, "continuous: {}", options.continuous)?;
    writeln!(out, "aligned: {}", options.aligned)?;
    writeln!(out, "additive: {}", options.additive)?;
    writeln!(out, "behind: {}", options.behind_others)?;
    writeln!(out, "premultiplied_alpha: {}", options.premultiplied_alpha)
}

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "- {title} -")
}

// returns whether the remaining fields follow
fn write_active(out: &mut String, value: &RangedValue, required: bool) -> Result<bool, fmt::Error> {
    if required {
        return Ok(true);
    }
    writeln!(out, "active: {}", value.active)?;
    Ok(value.active)
}

fn write_ranged(out: &mut String, value: &RangedValue, required: bool) -> fmt::Result {
    if !write_active(out, value, required)? {
        return Ok(());
    }
    writeln!(out, "low_min: {}", value.low.min)?;
    writeln!(out, "low_max: {}", value.low.max)
}

fn write_scaled(
    out: &mut String,
    value: &ScaledValue,
    required: bool,
    with_independent: bool,
) -> fmt::Result {
    if !write_active(out, &value.ranged, required)? {
        return Ok(());
    }
    writeln!(out, "low_min: {}", value.ranged.low.min)?;
    writeln!(out, "low_max: {}", value.ranged.low.max)?;
    writeln!(out, "high_min: {}", value.high.min)?;
    writeln!(out, "high_max: {}", value.high.max)?;
    writeln!(out, "relative: {}", value.relative)?;
    let points = value.curve.points();
    writeln!(out, "scaling_count: {}", points.len())?;
    for (i, point) in points.iter().enumerate() {
        writeln!(out, "scaling{i}: {}", point.scale)?;
    }
    writeln!(out, "timeline_count: {}", points.len())?;
    for (i, point) in points.iter().enumerate() {
        writeln!(out, "timeline{i}: {}", point.time)?;
    }
    if with_independent {
        writeln!(out, "independent: {}", value.independent)?;
    }
    Ok(())
}

fn write_spawn_shape(out: &mut String, value: &SpawnShapeValue) -> fmt::Result {
    writeln!(out, "shape: {}", value.shape)?;
    if value.shape == SpawnShape::Ellipse {
        writeln!(out, "edges: {}", value.edges_only)?;
        writeln!(out, "side: {}", value.side)?;
    }
    Ok(())
}

fn write_gradient(out: &mut String, gradient: &GradientCurve) -> fmt::Result {
    let colors = gradient.flat_colors();
    writeln!(out, "colors_count: {}", colors.len())?;
    for (i, channel) in colors.iter().enumerate() {
        writeln!(out, "colors{i}: {channel}")?;
    }
    let stops = gradient.stops();
    writeln!(out, "timeline_count: {}", stops.len())?;
    for (i, stop) in stops.iter().enumerate() {
        writeln!(out, "timeline{i}: {}", stop.time)?;
    }
    Ok(())
}

fn read_emitter(reader: &mut LineReader<'_>) -> Result<EmitterConfig, FormatError> {
    let (_, name) = reader.next_line("emitter name")?;
    let name = name.to_string();

    reader.section(FIRST_SECTION)?;
    let delay = read_ranged(reader, OPTIONAL)?;
    reader.section("Duration")?;
    let duration = read_ranged(reader, REQUIRED)?;
    reader.section("Count")?;
    let count = ParticleCount {
        min: reader.parse("min")?,
        max: reader.parse("max")?,
    };
    reader.section("Emission")?;
    let emission = read_scaled(reader, REQUIRED, false)?;
    reader.section("Life")?;
    let life = read_scaled(reader, REQUIRED, true)?;
    reader.section("Life Offset")?;
    let life_offset = read_scaled(reader, OPTIONAL, true)?;
    reader.section("X Offset")?;
    let x_offset = read_ranged(reader, OPTIONAL)?;
    reader.section("Y Offset")?;
    let y_offset = read_ranged(reader, OPTIONAL)?;
    reader.section("Spawn Shape")?;
    let spawn_shape = read_spawn_shape(reader)?;
    reader.section("Spawn Width")?;
    let spawn_width = read_scaled(reader, REQUIRED, false)?;
    reader.section("Spawn Height")?;
    let spawn_height = read_scaled(reader, REQUIRED, false)?;
    reader.section("Size")?;
    let size = read_scaled(reader, REQUIRED, false)?;
    reader.section("Speed")?;
    let speed = read_scaled(reader, OPTIONAL, false)?;
    reader.section("Direction")?;
    let direction = read_scaled(reader, OPTIONAL, false)?;
    reader.section("Rotation")?;
    let rotation = read_scaled(reader, OPTIONAL, false)?;
    reader.section("Wind")?;
    let wind = read_scaled(reader, OPTIONAL, false)?;
    reader.section("Gravity")?;
    let gravity = read_scaled(reader, OPTIONAL, false)?;
    reader.section("Tint")?;
    let tint = read_gradient(reader)?;
    reader.section("Opacity")?;
    let opacity = read_scaled(reader, REQUIRED, false)?;
    reader.section("Options")?;
    let options = EmitterOptions {
        attached: reader.parse("attached")?,
        continuous: reader.parse("continuous")?,
        aligned: reader.parse("aligned")?,
        additive: reader.parse("additive")?,
        behind_others: reader.parse("behind")?,
        premultiplied_alpha: reader.parse("premultiplied_alpha")?,
    };

    let mut config = EmitterConfig {
        name,
        delay,
        duration,
        count,
        emission,
        life,
        life_offset,
        x_offset,
        y_offset,
        spawn_shape,
        spawn_width,
        spawn_height,
        size,
        speed,
        direction,
        rotation,
        wind,
        gravity,
        tint,
        opacity,
        options,
        fixed_seed: None,
    };
    config.mark_required();
    config.validate()?;
    Ok(config)
}

fn read_active(reader: &mut LineReader<'_>, required: bool) -> Result<bool, FormatError> {
    if required {
        Ok(true)
    } else {
        reader.parse("active")
    }
}

fn read_ranged(reader: &mut LineReader<'_>, required: bool) -> Result<RangedValue, FormatError> {
    if !read_active(reader, required)? {
        return Ok(RangedValue::inactive());
    }
    let low = Range::new(reader.parse("low_min")?, reader.parse("low_max")?);
    Ok(RangedValue {
        active: true,
        always_active: required,
        low,
    })
}

fn read_scaled(
    reader: &mut LineReader<'_>,
    required: bool,
    with_independent: bool,
) -> Result<ScaledValue, FormatError> {
    if !read_active(reader, required)? {
        return Ok(ScaledValue::inactive());
    }
    let low = Range::new(reader.parse("low_min")?, reader.parse("low_max")?);
    let high = Range::new(reader.parse("high_min")?, reader.parse("high_max")?);
    let relative = reader.parse("relative")?;
    let scaling = reader.parse_array("scaling")?;
    let (line, timeline) = reader.parse_array_at("timeline")?;
    let curve = AttributeCurve::from_parts(&timeline, &scaling)
        .map_err(|source| FormatError::InvalidConfig { line, source })?;
    let independent = if with_independent {
        reader.parse("independent")?
    } else {
        false
    };

    let mut value = ScaledValue::new(low, high, curve)
        .relative(relative)
        .independent(independent);
    value.ranged.always_active = required;
    Ok(value)
}

fn read_spawn_shape(reader: &mut LineReader<'_>) -> Result<SpawnShapeValue, FormatError> {
    let shape: SpawnShape = reader.parse_config("shape")?;
    if shape != SpawnShape::Ellipse {
        return Ok(SpawnShapeValue::new(shape));
    }
    let edges_only = reader.parse("edges")?;
    let side: EllipseSide = reader.parse_config("side")?;
    Ok(SpawnShapeValue {
        shape,
        edges_only,
        side,
    })
}

fn read_gradient(reader: &mut LineReader<'_>) -> Result<GradientCurve, FormatError> {
    let colors = reader.parse_array("colors")?;
    let (line, timeline) = reader.parse_array_at("timeline")?;
    GradientCurve::from_parts(&timeline, &colors)
        .map_err(|source| FormatError::InvalidConfig { line, source })
}

struct LineReader<'a> {
    lines: Vec<&'a str>,
    next: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            next: 0,
        }
    }

    fn peek(&self) -> Option<(usize, &'a str)> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<(usize, &'a str)> {
        let index = self.next + ahead;
        self.lines.get(index).map(|&line| (index + 1, line))
    }

    fn skip_blank(&mut self) {
        while self.peek().is_some_and(|(_, line)| is_blank(line)) {
            self.next += 1;
        }
    }

    // a blank line right before the first section is an emitter's empty name
    fn skip_separators(&mut self) {
        while let Some((_, line)) = self.peek() {
            let names_emitter = self
                .peek_at(1)
                .is_some_and(|(_, after)| section_title(after) == Some(FIRST_SECTION));
            if !is_blank(line) || names_emitter {
                break;
            }
            self.next += 1;
        }
    }

    fn next_line(&mut self, expected: &str) -> Result<(usize, &'a str), FormatError> {
        let next = self.peek().ok_or_else(|| FormatError::UnexpectedEof {
            expected: expected.to_string(),
        })?;
        self.next += 1;
        Ok(next)
    }

    fn section(&mut self, title: &'static str) -> Result<(), FormatError> {
        let (line, found) = self.next_line(&format!("section \"- {title} -\""))?;
        if section_title(found) != Some(title) {
            return Err(FormatError::UnexpectedSection {
                line,
                expected: title,
                found: found.to_string(),
            });
        }
        Ok(())
    }

    fn field(&mut self, key: &str) -> Result<(usize, &'a str), FormatError> {
        let (line, text) = self.next_line(&format!("\"{key}\""))?;
        let Some((found, value)) = text.split_once(':') else {
            return Err(FormatError::MissingSeparator {
                line,
                key: key.to_string(),
            });
        };
        let found = found.trim();
        if found != key {
            return Err(FormatError::UnexpectedKey {
                line,
                expected: key.to_string(),
                found: found.to_string(),
            });
        }
        Ok((line, value.trim()))
    }

    fn parse<T: FromStr>(&mut self, key: &str) -> Result<T, FormatError> {
        let (line, value) = self.field(key)?;
        value.parse().map_err(|_| FormatError::InvalidValue {
            line,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn parse_config<T: FromStr<Err = ConfigError>>(&mut self, key: &str) -> Result<T, FormatError> {
        let (line, value) = self.field(key)?;
        value
            .parse()
            .map_err(|source| FormatError::InvalidConfig { line, source })
    }

    // `<prefix>_count: n` followed by `<prefix>0` .. `<prefix>{n-1}`
    fn parse_array(&mut self, prefix: &str) -> Result<Vec<f32>, FormatError> {
        self.parse_array_at(prefix).map(|(_, values)| values)
    }

    fn parse_array_at(&mut self, prefix: &str) -> Result<(usize, Vec<f32>), FormatError> {
        let count_key = format!("{prefix}_count");
        let line = self.peek().map_or(0, |(line, _)| line);
        let count: usize = self.parse(&count_key)?;
        let mut values = Vec::with_capacity(count.min(64));
        for i in 0..count {
            values.push(self.parse(&format!("{prefix}{i}"))?);
        }
        Ok((line, values))
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

// `- Title -` -> `Title`
fn section_title(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix('-')
        .and_then(|rest| rest.strip_suffix('-'))
        .map(str::trim)
}
