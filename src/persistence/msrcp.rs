//! Reader for the sectioned `.msrcp` instance format.
//!
//! ```text
//! \* Project Module *\
//! <activities> <resources> <skills> <levels>
//! <base deadline>
//! <level deadline>
//! <duration> <successor count> <successor ids, 1-based> ...   (one line per activity)
//! \* Workforce Module *\
//! <0/1 per skill>                                              (one line per resource)
//! \* Workforce Module with Skill Levels *\
//! <level per skill>                                            (one line per resource)
//! \* Skill Requirements Module *\
//! <headcount per skill>                                        (one line per activity)
//! \* Skill Level Requirements Module *\
//! <level per skill> | -1                                       (one line per activity)
//! ```
//!
//! Only the project module is mandatory. Blank lines are ignored; reported
//! line numbers are 1-based positions in the input text.

use super::{PersistenceError, PersistenceResult};
use crate::instance::{ActivityDefinition, ProjectDefinition, ProjectHeader, ResourceDefinition};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const PROJECT: &str = "Project Module";
const WORKFORCE: &str = "Workforce Module";
const WORKFORCE_LEVELS: &str = "Workforce Module with Skill Levels";
const SKILL_REQUIREMENTS: &str = "Skill Requirements Module";
const LEVEL_REQUIREMENTS: &str = "Skill Level Requirements Module";

struct Line<'a> {
    number: usize,
    text: &'a str,
}

struct SectionedText<'a> {
    lines: Vec<Line<'a>>,
    /// Section name -> index of its marker in `lines`.
    sections: HashMap<&'a str, usize>,
}

impl<'a> SectionedText<'a> {
    fn new(text: &'a str) -> Self {
        let lines: Vec<Line<'a>> = text
            .lines()
            .enumerate()
            .map(|(idx, raw)| Line {
                number: idx + 1,
                text: raw.trim(),
            })
            .filter(|line| !line.text.is_empty())
            .collect();

        let mut sections = HashMap::new();
        for (idx, line) in lines.iter().enumerate() {
            if line.text.starts_with("\\*") && line.text.ends_with("*\\") {
                let name = line.text.trim_matches(|c| c == '\\' || c == '*' || c == ' ');
                sections.insert(name, idx);
            }
        }
        Self { lines, sections }
    }

    fn has(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// The `count` lines following the marker of `section`, after skipping `skip`.
    fn rows(
        &self,
        section: &'static str,
        skip: usize,
        count: usize,
    ) -> PersistenceResult<&[Line<'a>]> {
        let marker = *self
            .sections
            .get(section)
            .ok_or(PersistenceError::MissingSection(section))?;
        let start = marker + 1 + skip;
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.lines.len());
        let Some(end) = end else {
            return Err(PersistenceError::Parse {
                line: self.lines.last().map_or(0, |line| line.number),
                message: format!(
                    "section '{section}' ends early: expected {count} rows after {skip} header lines"
                ),
            });
        };
        if let Some(stray) = self.lines[start..end]
            .iter()
            .find(|line| line.text.starts_with("\\*"))
        {
            return Err(PersistenceError::Parse {
                line: stray.number,
                message: format!("section '{section}' ends early: found another section marker"),
            });
        }
        Ok(&self.lines[start..end])
    }
}

fn parse_numbers<T: FromStr>(line: &Line<'_>) -> PersistenceResult<Vec<T>> {
    line.text
        .split_whitespace()
        .map(|token| {
            token.parse::<T>().map_err(|_| PersistenceError::Parse {
                line: line.number,
                message: format!("'{token}' is not a valid number"),
            })
        })
        .collect()
}

fn parse_single<T: FromStr>(line: &Line<'_>, what: &str) -> PersistenceResult<T> {
    let mut values = parse_numbers::<T>(line)?;
    if values.len() != 1 {
        return Err(PersistenceError::Parse {
            line: line.number,
            message: format!("expected a single {what}"),
        });
    }
    Ok(values.remove(0))
}

fn expect_width<T>(line: &Line<'_>, values: Vec<T>, width: usize) -> PersistenceResult<Vec<T>> {
    if values.len() != width {
        return Err(PersistenceError::Parse {
            line: line.number,
            message: format!("expected {width} values, found {}", values.len()),
        });
    }
    Ok(values)
}

/// Parses `.msrcp` text into an unvalidated [`ProjectDefinition`].
pub fn parse_msrcp(text: &str) -> PersistenceResult<ProjectDefinition> {
    let doc = SectionedText::new(text);

    let head = doc.rows(PROJECT, 0, 3)?;
    let counts = parse_numbers::<usize>(&head[0])?;
    let [num_activities, num_resources, num_skills, num_levels] = counts[..] else {
        return Err(PersistenceError::Parse {
            line: head[0].number,
            message: format!(
                "project header needs 4 counts (activities resources skills levels), found {}",
                counts.len()
            ),
        });
    };
    let header = ProjectHeader {
        num_activities,
        num_resources,
        num_skills,
        num_levels,
        base_deadline: parse_single(&head[1], "base deadline")?,
        level_deadline: parse_single(&head[2], "level deadline")?,
    };

    // Resources and skills may be declared without any rows to back them.
    for (what, count) in [("resources", num_resources), ("skills", num_skills)] {
        if count > text.len() {
            return Err(PersistenceError::Parse {
                line: head[0].number,
                message: format!("{count} {what} cannot be described by this file"),
            });
        }
    }

    let activity_rows = doc.rows(PROJECT, 3, num_activities)?;
    let mut activities = Vec::with_capacity(activity_rows.len());
    for line in activity_rows {
        let values = parse_numbers::<i64>(line)?;
        let (duration, declared) = match values[..] {
            [duration, declared, ..] if declared >= 0 => (duration, declared as usize),
            _ => {
                return Err(PersistenceError::Parse {
                    line: line.number,
                    message: "activity row needs a duration and a successor count".into(),
                });
            }
        };
        let listed = &values[2..];
        if listed.len() < declared {
            return Err(PersistenceError::Parse {
                line: line.number,
                message: format!(
                    "activity declares {declared} successors but lists {}",
                    listed.len()
                ),
            });
        }
        let successors = listed[..declared]
            .iter()
            .map(|&one_based| {
                if one_based < 1 {
                    Err(PersistenceError::Parse {
                        line: line.number,
                        message: format!("successor id {one_based} is not 1-based"),
                    })
                } else {
                    Ok((one_based - 1) as usize)
                }
            })
            .collect::<PersistenceResult<Vec<_>>>()?;
        activities.push(ActivityDefinition::new(duration, successors));
    }

    let skills: Vec<Vec<bool>> = if doc.has(WORKFORCE) {
        doc.rows(WORKFORCE, 0, num_resources)?
            .iter()
            .map(|line| {
                let row = expect_width(line, parse_numbers::<u32>(line)?, num_skills)?;
                Ok(row.into_iter().map(|flag| flag != 0).collect())
            })
            .collect::<PersistenceResult<_>>()?
    } else {
        Vec::new()
    };

    let levels: Vec<Vec<u32>> = if doc.has(WORKFORCE_LEVELS) {
        doc.rows(WORKFORCE_LEVELS, 0, num_resources)?
            .iter()
            .map(|line| expect_width(line, parse_numbers::<u32>(line)?, num_skills))
            .collect::<PersistenceResult<_>>()?
    } else {
        Vec::new()
    };

    let resources = (0..num_resources)
        .map(|id| {
            let skill_levels = levels
                .get(id)
                .cloned()
                .unwrap_or_else(|| vec![0; num_skills]);
            // Without a workforce matrix, any positive level implies the skill.
            let skill_flags = skills
                .get(id)
                .cloned()
                .unwrap_or_else(|| skill_levels.iter().map(|&level| level > 0).collect());
            ResourceDefinition::new(skill_flags, skill_levels)
        })
        .collect();

    if doc.has(SKILL_REQUIREMENTS) {
        for (activity, line) in activities
            .iter_mut()
            .zip(doc.rows(SKILL_REQUIREMENTS, 0, num_activities)?)
        {
            activity.skill_requirements =
                expect_width(line, parse_numbers::<u32>(line)?, num_skills)?;
        }
    }

    if doc.has(LEVEL_REQUIREMENTS) {
        for (activity, line) in activities
            .iter_mut()
            .zip(doc.rows(LEVEL_REQUIREMENTS, 0, num_activities)?)
        {
            activity.skill_level_requirements = if line.text == "-1" {
                None
            } else {
                Some(expect_width(
                    line,
                    parse_numbers::<u32>(line)?,
                    num_skills,
                )?)
            };
        }
    }

    debug!(
        activities = num_activities,
        resources = num_resources,
        skills = num_skills,
        "parsed msrcp project"
    );

    Ok(ProjectDefinition {
        header,
        activities,
        resources,
    })
}

pub fn load_definition_from_msrcp<P: AsRef<Path>>(path: P) -> PersistenceResult<ProjectDefinition> {
    let text = fs::read_to_string(path)?;
    parse_msrcp(&text)
}
