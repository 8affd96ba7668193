// File: src/model/parser.rs
use crate::command::{Command, EditDescriptor};
use crate::model::{Cadence, DATE_FORMAT, EventFilter, TIME_FORMAT};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

pub const PREFIX_NAME: &str = "n/";
pub const PREFIX_DATE: &str = "d/";
pub const PREFIX_START: &str = "s/";
pub const PREFIX_END: &str = "e/";
pub const PREFIX_EVERY: &str = "every/";

pub const ADD_USAGE: &str = "add n/NAME d/DATE s/START e/END  (e.g. add n/Tennis d/2023-12-20 s/18:00 e/20:00)";
pub const EDIT_USAGE: &str = "edit INDEX [n/NAME] [d/DATE] [s/START] [e/END]  (e.g. edit 1 n/Squash)";
pub const DELETE_USAGE: &str = "delete INDEX [INDEX]...  (e.g. delete 1 3)";
pub const RECUR_USAGE: &str = "recur INDEX d/END_DATE every/day|week|month  (e.g. recur 1 d/2024-02-28 every/month)";
pub const FIND_USAGE: &str = "find [n/KEYWORDS] [d/DATE]  (e.g. find n/tennis gym d/2023-12-20)";
pub const NEXT_USAGE: &str = "next [COUNT]  (e.g. next 3)";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: '{0}'. Type 'help' to see the available commands")]
    UnknownCommand(String),
    #[error("Invalid command format!\n{0}")]
    InvalidFormat(&'static str),
    #[error("Index must be a positive integer: '{0}'")]
    InvalidIndex(String),
    #[error("Dates must be YYYY-MM-DD and valid: '{0}'")]
    InvalidDate(String),
    #[error("Times must be HH:MM: '{0}'")]
    InvalidTime(String),
    #[error("Recurrence must be one of day, week, month: '{0}'")]
    InvalidCadence(String),
    #[error("At least one field to edit must be provided.")]
    NoFieldEdited,
    #[error("Event name must not be empty")]
    EmptyName,
}

/// Arguments split by prefix: the text before the first prefix, and the last
/// value given for each prefix.
#[derive(Debug, Default)]
struct ArgMap {
    preamble: String,
    values: HashMap<&'static str, String>,
}

impl ArgMap {
    fn get(&self, prefix: &str) -> Option<&str> {
        self.values.get(prefix).map(|s| s.as_str())
    }
}

/// A prefix only counts at the start of a whitespace-separated word, so names
/// like "and/or" stay intact.
fn tokenize(args: &str, prefixes: &[&'static str]) -> ArgMap {
    let padded = format!(" {}", args);
    let mut marks: Vec<(usize, &'static str)> = Vec::new();

    for &prefix in prefixes {
        let needle = format!(" {}", prefix);
        let mut from = 0;
        while let Some(found) = padded[from..].find(&needle) {
            let at = from + found;
            marks.push((at, prefix));
            from = at + needle.len();
        }
    }
    marks.sort_by_key(|(at, _)| *at);

    let mut map = ArgMap::default();
    let first = marks.first().map(|(at, _)| *at).unwrap_or(padded.len());
    map.preamble = padded[..first].trim().to_string();

    for (i, &(at, prefix)) in marks.iter().enumerate() {
        let start = at + 1 + prefix.len();
        let end = marks.get(i + 1).map(|(next, _)| *next).unwrap_or(padded.len());
        map.values.insert(prefix, padded[start..end].trim().to_string());
    }
    map
}

pub fn parse_index(raw: &str) -> Result<usize, ParseError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ParseError::InvalidIndex(raw.trim().to_string())),
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(raw.trim().to_string()))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|_| ParseError::InvalidTime(raw.trim().to_string()))
}

fn parse_name(raw: &str) -> Result<String, ParseError> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(ParseError::EmptyName);
    }
    Ok(name)
}

fn no_arguments(command: Command, args: &str, word: &str) -> Result<Command, ParseError> {
    if args.trim().is_empty() {
        Ok(command)
    } else {
        Err(ParseError::UnknownCommand(format!("{} {}", word, args.trim())))
    }
}

/// Turns one line of user input into a validated command.
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let input = input.trim();
    let (word, args) = match input.split_once(char::is_whitespace) {
        Some((w, rest)) => (w, rest),
        None => (input, ""),
    };

    match word {
        "add" => parse_add(args),
        "edit" => parse_edit(args),
        "delete" => parse_delete(args),
        "recur" => parse_recur(args),
        "find" => parse_find(args),
        "next" => parse_next(args),
        "list" => no_arguments(Command::List, args, word),
        "clear" => no_arguments(Command::Clear, args, word),
        "undo" => no_arguments(Command::Undo, args, word),
        "help" => no_arguments(Command::Help, args, word),
        "exit" => no_arguments(Command::Exit, args, word),
        "" => Err(ParseError::UnknownCommand(String::new())),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_add(args: &str) -> Result<Command, ParseError> {
    let map = tokenize(args, &[PREFIX_NAME, PREFIX_DATE, PREFIX_START, PREFIX_END]);
    if !map.preamble.is_empty() {
        return Err(ParseError::InvalidFormat(ADD_USAGE));
    }

    let (Some(name), Some(date), Some(start), Some(end)) = (
        map.get(PREFIX_NAME),
        map.get(PREFIX_DATE),
        map.get(PREFIX_START),
        map.get(PREFIX_END),
    ) else {
        return Err(ParseError::InvalidFormat(ADD_USAGE));
    };

    Ok(Command::Add {
        name: parse_name(name)?,
        date: parse_date(date)?,
        start_time: parse_time(start)?,
        end_time: parse_time(end)?,
    })
}

fn parse_edit(args: &str) -> Result<Command, ParseError> {
    let map = tokenize(args, &[PREFIX_NAME, PREFIX_DATE, PREFIX_START, PREFIX_END]);
    if map.preamble.is_empty() {
        return Err(ParseError::InvalidFormat(EDIT_USAGE));
    }
    let index = parse_index(&map.preamble)?;

    let descriptor = EditDescriptor {
        name: map.get(PREFIX_NAME).map(parse_name).transpose()?,
        date: map.get(PREFIX_DATE).map(parse_date).transpose()?,
        start_time: map.get(PREFIX_START).map(parse_time).transpose()?,
        end_time: map.get(PREFIX_END).map(parse_time).transpose()?,
    };

    if !descriptor.is_any_field_edited() {
        return Err(ParseError::NoFieldEdited);
    }
    Ok(Command::Edit { index, descriptor })
}

fn parse_delete(args: &str) -> Result<Command, ParseError> {
    let indexes = args
        .split_whitespace()
        .map(parse_index)
        .collect::<Result<Vec<_>, _>>()?;

    if indexes.is_empty() {
        return Err(ParseError::InvalidFormat(DELETE_USAGE));
    }
    Ok(Command::Delete { indexes })
}

fn parse_recur(args: &str) -> Result<Command, ParseError> {
    let map = tokenize(args, &[PREFIX_DATE, PREFIX_EVERY]);
    if map.preamble.is_empty() {
        return Err(ParseError::InvalidFormat(RECUR_USAGE));
    }
    let index = parse_index(&map.preamble)?;

    let (Some(end), Some(every)) = (map.get(PREFIX_DATE), map.get(PREFIX_EVERY)) else {
        return Err(ParseError::InvalidFormat(RECUR_USAGE));
    };

    let cadence =
        Cadence::from_str(every).map_err(|_| ParseError::InvalidCadence(every.to_string()))?;

    Ok(Command::Recur {
        index,
        end_date: parse_date(end)?,
        cadence,
    })
}

fn parse_find(args: &str) -> Result<Command, ParseError> {
    let map = tokenize(args, &[PREFIX_NAME, PREFIX_DATE]);
    if !map.preamble.is_empty() {
        return Err(ParseError::InvalidFormat(FIND_USAGE));
    }

    let keywords = match map.get(PREFIX_NAME) {
        Some(raw) => {
            let words: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
            if words.is_empty() {
                return Err(ParseError::InvalidFormat(FIND_USAGE));
            }
            Some(words)
        }
        None => None,
    };
    let date = map.get(PREFIX_DATE).map(parse_date).transpose()?;

    let filter = match (keywords, date) {
        (None, None) => return Err(ParseError::InvalidFormat(FIND_USAGE)),
        (Some(kw), None) => EventFilter::NameKeywords(kw),
        (None, Some(d)) => EventFilter::OnDate(d),
        (keywords, date) => EventFilter::Find { keywords, date },
    };
    Ok(Command::Find(filter))
}

fn parse_next(args: &str) -> Result<Command, ParseError> {
    let raw = args.trim();
    if raw.is_empty() {
        return Ok(Command::Next(None));
    }
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Command::Next(Some(n))),
        _ => Err(ParseError::InvalidFormat(NEXT_USAGE)),
    }
}
