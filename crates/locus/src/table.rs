//! Table checks
//!
//! Expected values are comma separated; `\,` stands for a literal comma.
//!
//! | Validation  | Expected value            | Check                                         |
//! |-------------|---------------------------|-----------------------------------------------|
//! | `ROWCOUNT`  | `3`                       | number of rows                                |
//! | `COLCOUNT`  | `4`                       | number of columns                             |
//! | `TABLEDATA` | `a,b,c`                   | cells appear consecutively, row-major         |
//! | `RELATIVE`  | `base,offset,text#...`    | cell `offset` after a `base` cell is `text`   |
//! | `TABLECELL` | `row,col,text`            | trimmed cell at `row`,`col` equals `text`     |

use crate::driver::TableData;
use crate::result::LocusError;
use std::fmt;
use std::str::FromStr;

/// Kind of table check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableValidation {
    /// Column count
    ColCount,
    /// Row count
    RowCount,
    /// Consecutive cell data
    TableData,
    /// Cell relative to a base cell
    Relative,
    /// Single cell value
    TableCell,
}

impl TableValidation {
    /// Keyword as written in scripts
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::ColCount => "COLCOUNT",
            Self::RowCount => "ROWCOUNT",
            Self::TableData => "TABLEDATA",
            Self::Relative => "RELATIVE",
            Self::TableCell => "TABLECELL",
        }
    }

    /// Check `table` against `expected`.
    ///
    /// # Errors
    ///
    /// Returns the verification detail when the check does not hold or the
    /// expected value cannot be parsed
    pub fn check(self, expected: &str, table: &TableData) -> Result<(), String> {
        match self {
            Self::ColCount => check_count("column", expected, table.column_count()),
            Self::RowCount => check_count("row", expected, table.row_count()),
            Self::TableData => check_data(expected, table),
            Self::Relative => check_relative(expected, table),
            Self::TableCell => check_cell(expected, table),
        }
    }
}

impl fmt::Display for TableValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for TableValidation {
    type Err = LocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COLCOUNT" => Ok(Self::ColCount),
            "ROWCOUNT" => Ok(Self::RowCount),
            "TABLEDATA" => Ok(Self::TableData),
            "RELATIVE" => Ok(Self::Relative),
            "TABLECELL" => Ok(Self::TableCell),
            other => Err(LocusError::config(format!("unknown table validation '{other}'"))),
        }
    }
}

/// Split on commas not preceded by `\`, then unescape `\,`
#[must_use]
pub fn split_escaped(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_backslash = false;
    for c in value.chars() {
        if c == ',' && !prev_backslash {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
        prev_backslash = c == '\\';
    }
    parts.push(current);
    parts.into_iter().map(|p| p.replace("\\,", ",")).collect()
}

fn check_count(what: &str, expected: &str, actual: usize) -> Result<(), String> {
    let wanted: usize = expected
        .trim()
        .parse()
        .map_err(|_| format!("Invalid input data : {expected}"))?;
    if wanted == actual {
        Ok(())
    } else {
        Err(format!(
            "Expected {what} count {wanted} does not match the actual {actual}"
        ))
    }
}

fn check_data(expected: &str, table: &TableData) -> Result<(), String> {
    let mut wanted = split_escaped(expected);
    while wanted.last().is_some_and(String::is_empty) {
        let _ = wanted.pop();
    }
    let actual = table.cells();
    let wanted_joined = wanted.join("|");
    if actual.join("|").contains(&wanted_joined) {
        Ok(())
    } else {
        Err(format!(
            "Expected data {wanted:?} does not match the actual : {actual:?}"
        ))
    }
}

fn check_relative(expected: &str, table: &TableData) -> Result<(), String> {
    let cells = table.cells();
    let mut errors = String::new();

    for entry in expected.split('#') {
        let parts = split_escaped(entry);
        let [base, offset, text] = parts.as_slice() else {
            errors.push_str(&format!(" | Invalid RELATIVE entry : {entry}\n"));
            continue;
        };
        let Ok(offset) = offset.trim().parse::<i64>() else {
            errors.push_str(&format!(" | Invalid offset : {offset}\n"));
            continue;
        };
        errors.push_str(&relative_mismatch(&cells, base, offset, text));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(format!("Verification errors{errors}"))
    }
}

/// Empty when some occurrence of `base` has `text` at `offset`
fn relative_mismatch(cells: &[String], base: &str, offset: i64, text: &str) -> String {
    let bases: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.as_str() == base)
        .map(|(i, _)| i)
        .collect();
    if bases.is_empty() {
        return format!(" | Expected RELATIVE text: {base} is not present in the actual table \n");
    }

    let mut mismatches = String::new();
    for index in bases {
        let target = i64::try_from(index).ok().and_then(|i| i.checked_add(offset));
        let actual = target
            .and_then(|t| usize::try_from(t).ok())
            .and_then(|t| cells.get(t));
        match actual {
            Some(actual) if actual == text => return String::new(),
            Some(actual) => mismatches.push_str(&format!(
                " | Expected : {text} Actual :{actual} Base value : {base}\n"
            )),
            None => mismatches.push_str(&format!(
                " | Expected value : {text} cannot be found in the field: {} in the actual table\n",
                target.unwrap_or_default()
            )),
        }
    }
    mismatches
}

fn check_cell(expected: &str, table: &TableData) -> Result<(), String> {
    let parts = split_escaped(expected);
    if parts.len() < 3 {
        return Err(format!("Verification data not provided correctly. {expected}"));
    }
    let (Ok(row), Ok(col)) = (parts[0].trim().parse::<usize>(), parts[1].trim().parse::<usize>()) else {
        return Err(format!("Invalid input data : {expected}"));
    };
    let text = parts[2..].join(",");

    let Some(cells) = table.row(row) else {
        return Err(format!(
            "Verification errors | Expected Row : {row} cannot be found in the actual table \n"
        ));
    };
    match cells.get(col) {
        Some(actual) if actual.trim() == text => Ok(()),
        Some(actual) => Err(format!("Verification errors | Expected : {text} Actual :{actual}\n")),
        None => Err(format!(
            "Verification errors | Expected Column : {col} cannot be found in the actual table \n"
        )),
    }
}
