// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Compiles rhythm notation into loopable note sequences. The same compiled
//! form drives the audible click in the engine and the subdivision overlay on
//! the visualizer.

use pest::iterators::Pair;
use pest::Parser;

mod error;
mod grammar;
mod pattern;
#[cfg(test)]
mod tests;

pub use error::{ParseError, MAX_COUNT, MAX_NOTES, MIN_SPAN};
pub use pattern::{CompiledPattern, Note, ACCENT, BEAT, DOWNBEAT, SUBDIVISION};

use grammar::{RhythmParser, Rule};

/// One segment of a group, before times are resolved.
#[derive(Debug)]
struct Step {
    weight: f64,
    hit: Option<Hit>,
}

#[derive(Debug)]
struct Hit {
    accent: bool,
    sound: Option<String>,
}

/// A group of steps sharing a span of beats.
#[derive(Debug)]
struct Group {
    steps: Vec<Step>,
    span: f64,
}

/// Compiles pattern text. Identical text always compiles to identical notes.
pub fn compile(text: &str) -> Result<CompiledPattern, ParseError> {
    let pairs =
        RhythmParser::parse(Rule::pattern, text).map_err(|e| ParseError::syntax(text, e))?;

    let mut groups = Vec::new();
    for pair in pairs {
        for inner_pair in pair.into_inner() {
            match inner_pair.as_rule() {
                Rule::group => groups.push(parse_group(inner_pair)?),
                _ => {
                    // EOI
                }
            }
        }
    }

    let mut notes = Vec::new();
    let mut group_start = 0.0;
    for (group_index, group) in groups.iter().enumerate() {
        let total_weight: f64 = group.steps.iter().map(|step| step.weight).sum();
        let mut elapsed_weight = 0.0;
        for (step_index, step) in group.steps.iter().enumerate() {
            if let Some(hit) = &step.hit {
                let time = group_start + group.span * (elapsed_weight / total_weight);
                notes.push(Note::new(time, hit_tags(hit, group_index, step_index)));
            }
            elapsed_weight += step.weight;
        }
        group_start += group.span;
    }

    if notes.is_empty() {
        return Err(ParseError::NoHits);
    }
    if notes.len() > MAX_NOTES {
        return Err(ParseError::TooManyNotes(notes.len()));
    }

    Ok(CompiledPattern::new(notes, group_start, text))
}

fn hit_tags(hit: &Hit, group_index: usize, step_index: usize) -> Vec<String> {
    let position = match (group_index, step_index) {
        (0, 0) => DOWNBEAT,
        (_, 0) => BEAT,
        _ => SUBDIVISION,
    };

    let mut tags = vec![position.to_string()];
    if hit.accent {
        tags.push(ACCENT.to_string());
    }
    if let Some(sound) = &hit.sound {
        tags.push(sound.clone());
    }
    tags
}

fn parse_group(pair: Pair<Rule>) -> Result<Group, ParseError> {
    let mut steps = Vec::new();
    let mut span = 1.0;

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::count => {
                let text = inner_pair.as_str();
                let count = match text.parse::<u32>() {
                    Ok(count) if (1..=MAX_COUNT).contains(&count) => count,
                    _ => return Err(ParseError::Count(text.to_string())),
                };
                steps.extend((0..count).map(|_| Step {
                    weight: 1.0,
                    hit: Some(Hit {
                        accent: false,
                        sound: None,
                    }),
                }));
            }
            Rule::weights => {
                // weights = { "[" ~ step ~ (","? ~ step)* ~ "]" }
                for step_pair in inner_pair.into_inner() {
                    if step_pair.as_rule() == Rule::step {
                        steps.push(parse_step(step_pair)?);
                    }
                }
            }
            Rule::span => {
                let text = inner_pair.as_str();
                span = parse_positive("span", text)?;
                if span < MIN_SPAN {
                    return Err(ParseError::SpanTooShort(text.to_string()));
                }
            }
            _ => {}
        }
    }

    Ok(Group { steps, span })
}

fn parse_step(pair: Pair<Rule>) -> Result<Step, ParseError> {
    let mut step = Step {
        weight: 1.0,
        hit: None,
    };

    // step is a wrapper around exactly one of rest or hit.
    for kind_pair in pair.into_inner() {
        let is_hit = kind_pair.as_rule() == Rule::hit;
        let mut hit = Hit {
            accent: false,
            sound: None,
        };

        for part in kind_pair.into_inner() {
            match part.as_rule() {
                Rule::weight => step.weight = parse_positive("weight", part.as_str())?,
                Rule::accent => hit.accent = true,
                Rule::sound => {
                    for name_pair in part.into_inner() {
                        if name_pair.as_rule() == Rule::name {
                            hit.sound = Some(name_pair.as_str().to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        if is_hit {
            step.hit = Some(hit);
        }
    }

    Ok(step)
}

fn parse_positive(what: &'static str, text: &str) -> Result<f64, ParseError> {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(ParseError::NonPositive {
            what,
            value: text.to_string(),
        }),
    }
}
