//! Input formats (§6.3): "a collaborator, not the engine" — these parsers
//! turn text into the `(clauses, group_id)` pairs and the optional variable-
//! group map that `Engine::add_clause`/`VariableGroupMap::assign` consume;
//! the engine itself never sees a byte of input syntax.
//!
//! Grounded in `examples/radrow-satisfaction/solver/src/cnf.rs`'s
//! `CNF::from_dimacs` for the overall shape (strip comments, read a `p`
//! header, then one clause per remaining line), generalised to the
//! `{group}` clause prefix and `{vg} v1 v2 ... 0` variable-group blocks
//! `original_source/src/parse/vgcnffmt/vgcnffmt.hh` parses for GCNF/VGCNF.
//! The teacher's own parser leans on the `dimacs` crate, which only
//! understands plain DIMACS CNF/SAT and has no notion of group prefixes, so
//! group-aware parsing is hand-rolled here instead of bent to fit it.

use crate::error::{GmusError, Result};
use crate::ids::{GroupId, Literal};
use crate::variable_group::VariableGroupMap;

/// One parsed clause together with the group id it was read under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedClause {
    pub literals: Vec<Literal>,
    pub group: GroupId,
}

/// The result of parsing one input file: clauses in file order, plus a
/// variable-group map (only populated for VGCNF input).
#[derive(Debug, Clone, Default)]
pub struct ParsedInstance {
    pub clauses: Vec<ParsedClause>,
    pub variable_groups: VariableGroupMap,
    pub declared_num_vars: Option<u32>,
}

fn strip_comment_and_trim(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('c') {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_ints(tokens: &str) -> Result<Vec<i64>> {
    tokens
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i64>()
                .map_err(|_| GmusError::MalformedInput(format!("expected an integer, got '{tok}'")))
        })
        .collect()
}

/// Reads a plain clause line (`lit lit ... 0`), validating the trailing
/// zero terminator and rejecting an embedded zero literal.
fn parse_clause_line(line: &str) -> Result<Vec<Literal>> {
    let mut ints = parse_ints(line)?;
    match ints.pop() {
        Some(0) => {}
        Some(_) => {
            return Err(GmusError::MalformedInput(
                "clause line is missing its trailing 0".to_string(),
            ))
        }
        None => {
            return Err(GmusError::MalformedInput(
                "empty clause line before the trailing 0".to_string(),
            ))
        }
    }
    if ints.iter().any(|&l| l == 0) {
        return Err(GmusError::MalformedInput(
            "clause contains an embedded zero literal".to_string(),
        ));
    }
    Ok(ints)
}

/// Splits a leading `{...}` group/variable-group tag off a line, returning
/// the tag's integer payload and the remaining line.
fn split_braced_prefix(line: &str) -> Result<Option<(i64, &str)>> {
    let Some(rest) = line.strip_prefix('{') else {
        return Ok(None);
    };
    let close = rest
        .find('}')
        .ok_or_else(|| GmusError::MalformedInput("unterminated '{' in group tag".to_string()))?;
    let (tag, after) = rest.split_at(close);
    let after = &after[1..];
    let tag: i64 = tag
        .trim()
        .parse()
        .map_err(|_| GmusError::MalformedInput(format!("non-numeric group tag '{tag}'")))?;
    Ok(Some((tag, after.trim())))
}

/// Parses plain DIMACS CNF: each clause becomes its own fresh group (§6.3
/// "each clause becomes a singleton group with a fresh id").
pub fn parse_cnf(input: &str) -> Result<ParsedInstance> {
    let mut instance = ParsedInstance::default();
    let mut next_group: GroupId = 1;

    for raw_line in input.lines() {
        let Some(line) = strip_comment_and_trim(raw_line) else {
            continue;
        };
        if let Some(header) = line.strip_prefix('p') {
            let header = header.trim();
            if let Some(rest) = header.strip_prefix("cnf") {
                let nums = parse_ints(rest)?;
                instance.declared_num_vars = nums.first().map(|&n| n as u32);
            }
            continue;
        }
        let literals = parse_clause_line(line)?;
        instance.clauses.push(ParsedClause {
            literals,
            group: next_group,
        });
        next_group += 1;
    }
    Ok(instance)
}

/// Parses GCNF: each clause line starts with an explicit `{g}` group tag;
/// group 0 is the permanent background group (§3, §6.3).
pub fn parse_gcnf(input: &str) -> Result<ParsedInstance> {
    let mut instance = ParsedInstance::default();

    for raw_line in input.lines() {
        let Some(line) = strip_comment_and_trim(raw_line) else {
            continue;
        };
        if let Some(header) = line.strip_prefix('p') {
            let header = header.trim();
            if let Some(rest) = header.strip_prefix("gcnf") {
                let nums = parse_ints(rest)?;
                instance.declared_num_vars = nums.first().map(|&n| n as u32);
            }
            continue;
        }
        let Some((group, rest)) = split_braced_prefix(line)? else {
            return Err(GmusError::MalformedInput(
                "GCNF clause line is missing its leading '{g}' tag".to_string(),
            ));
        };
        if group < 0 {
            return Err(GmusError::MalformedInput(format!(
                "negative group id {group} in GCNF input"
            )));
        }
        let literals = parse_clause_line(rest)?;
        instance.clauses.push(ParsedClause {
            literals,
            group: group as GroupId,
        });
    }
    Ok(instance)
}

/// Parses VGCNF: clauses as in plain CNF (one fresh group per clause, §6.3),
/// preceded by zero or more `{vg} v1 v2 ... 0` variable-group blocks.
/// Variables never mentioned in a block default to variable-group 0.
pub fn parse_vgcnf(input: &str) -> Result<ParsedInstance> {
    let mut instance = ParsedInstance::default();
    let mut next_group: GroupId = 1;

    for raw_line in input.lines() {
        let Some(line) = strip_comment_and_trim(raw_line) else {
            continue;
        };
        if let Some(header) = line.strip_prefix('p') {
            let header = header.trim();
            if let Some(rest) = header.strip_prefix("vgcnf") {
                let nums = parse_ints(rest)?;
                instance.declared_num_vars = nums.first().map(|&n| n as u32);
            }
            continue;
        }
        if let Some((vg, rest)) = split_braced_prefix(line)? {
            if vg < 0 {
                return Err(GmusError::MalformedInput(format!(
                    "negative variable-group id {vg} in VGCNF input"
                )));
            }
            let mut vars = parse_ints(rest)?;
            match vars.pop() {
                Some(0) => {}
                _ => {
                    return Err(GmusError::MalformedInput(
                        "variable-group block is missing its trailing 0".to_string(),
                    ))
                }
            }
            for var in vars {
                if var <= 0 {
                    return Err(GmusError::MalformedInput(format!(
                        "non-positive variable id {var} in variable-group block"
                    )));
                }
                instance.variable_groups.assign(var as u32, vg as GroupId)?;
            }
            continue;
        }
        let literals = parse_clause_line(line)?;
        instance.clauses.push(ParsedClause {
            literals,
            group: next_group,
        });
        next_group += 1;
    }
    Ok(instance)
}
