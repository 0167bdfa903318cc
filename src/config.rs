use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::QuizError;
use crate::grader::{GradeTable, Grader};

pub const DATA_DIR_ENV: &str = "GEOQUIZ_DATA_DIR";
pub const SESSION_DIR_ENV: &str = "GEOQUIZ_SESSION_DIR";
pub const LEDGER_ENV: &str = "GEOQUIZ_LEDGER";
pub const GRADES_ENV: &str = "GEOQUIZ_GRADES";

/// Where the local client finds region data and keeps its state.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub session_dir: PathBuf,
    pub ledger_path: PathBuf,
    // Built-in grade table when unset
    pub grades_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            data_dir: PathBuf::from("data"),
            session_dir: PathBuf::from(".geoquiz/sessions"),
            ledger_path: PathBuf::from(".geoquiz/passport.dat"),
            grades_path: None,
        }
    }
}

/// Command line value first, then the environment.
fn resolve(arg: Option<&str>, env_value: Option<OsString>) -> Option<PathBuf> {
    arg.map(PathBuf::from).or_else(|| env_value.map(PathBuf::from))
}

impl Config {
    pub fn from_args(
        data_dir: Option<&str>,
        session_dir: Option<&str>,
        ledger: Option<&str>,
        grades: Option<&str>,
    ) -> Config {
        let defaults = Config::default();
        Config {
            data_dir: resolve(data_dir, env::var_os(DATA_DIR_ENV)).unwrap_or(defaults.data_dir),
            session_dir: resolve(session_dir, env::var_os(SESSION_DIR_ENV))
                .unwrap_or(defaults.session_dir),
            ledger_path: resolve(ledger, env::var_os(LEDGER_ENV)).unwrap_or(defaults.ledger_path),
            grades_path: resolve(grades, env::var_os(GRADES_ENV)),
        }
    }

    pub fn grader(&self) -> Result<Grader, QuizError> {
        let table = match self.grades_path {
            Some(ref path) => GradeTable::load(path)?,
            None => GradeTable::default(),
        };
        Grader::new(table)
    }
}
