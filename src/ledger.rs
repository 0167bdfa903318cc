use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;

use crate::card::{GameType, QuizMode};
use crate::error::QuizError;
use crate::gameplay::GameInfo;
use crate::grader::Grader;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GameResult {
    pub region_path: String,
    pub mode: QuizMode,
    pub game_type: GameType,
    pub finished: SystemTime,
    pub info: GameInfo,
    pub grade: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum LedgerEntry {
    GameResult(GameResult),
}

/// Best showing on one (region, mode) pair: the passport's visa stamp.
#[derive(Clone, Debug, PartialEq)]
pub struct Stamp {
    pub grade: String,
    pub best_percentage: f64,
    pub plays: u32,
}

pub type Passport = BTreeMap<(String, QuizMode), Stamp>;

pub fn append_to_ledger(update: &LedgerEntry, ledger_path: &Path) -> Result<(), QuizError> {
    let serialized =
        serde_json::to_string(update).map_err(|err| QuizError::json(ledger_path, err))?;
    if let Some(parent) = ledger_path.parent() {
        fs::create_dir_all(parent).map_err(|err| QuizError::io(parent, err))?;
    }

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(ledger_path)
        .map_err(|err| QuizError::io(ledger_path, err))?;
    writeln!(file, "{}", serialized)
        .and_then(|_| file.flush())
        .map_err(|err| QuizError::io(ledger_path, err))?;
    debug!("Appended to ledger {:?}: {}", ledger_path, serialized);
    Ok(())
}

/// Every entry in the ledger, oldest first. A ledger that does not exist yet
/// is empty.
pub fn read_ledger(ledger_path: &Path) -> Result<Vec<LedgerEntry>, QuizError> {
    let file = match File::open(ledger_path) {
        Ok(file) => file,
        Err(ref err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
        Err(err) => return Err(QuizError::io(ledger_path, err)),
    };
    let mut entries = vec![];
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|err| QuizError::io(ledger_path, err))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry = serde_json::from_str(&line).map_err(|err| QuizError::json(ledger_path, err))?;
        entries.push(entry);
    }
    Ok(entries)
}

pub fn update_from_ledger(ledger_entry: &LedgerEntry, passport: &mut Passport, grader: &Grader) {
    match *ledger_entry {
        LedgerEntry::GameResult(ref result) => {
            let key = (result.region_path.clone(), result.mode);
            let percentage = result.info.correct_percentage;
            let stamp = passport.entry(key).or_insert_with(|| Stamp {
                grade: result.grade.clone(),
                best_percentage: percentage,
                plays: 0,
            });
            stamp.grade = grader.max(&stamp.grade, &result.grade).to_string();
            if percentage > stamp.best_percentage {
                stamp.best_percentage = percentage;
            }
            stamp.plays += 1;
        }
    }
}

pub fn best_grades(entries: &[LedgerEntry], grader: &Grader) -> Passport {
    let mut passport = Passport::new();
    for entry in entries {
        update_from_ledger(entry, &mut passport, grader);
    }
    passport
}
