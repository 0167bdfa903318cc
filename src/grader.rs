use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::QuizError;
use crate::gameplay::GameInfo;

/// Requirements for one grade. A grade with neither requirement is earned
/// by anyone who gets that far down the table.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GradeSpec {
    pub grade: String,
    // Title shown alongside the grade, e.g. "Ambassador"
    pub rank: String,
    #[serde(default)]
    pub min_percentage: Option<f64>,
    #[serde(default)]
    pub max_seconds_per_subregion: Option<f64>,
}

impl GradeSpec {
    pub fn new<G: Into<String>, R: Into<String>>(grade: G, rank: R) -> GradeSpec {
        GradeSpec {
            grade: grade.into(),
            rank: rank.into(),
            min_percentage: None,
            max_seconds_per_subregion: None,
        }
    }

    pub fn min_percentage(mut self, percentage: f64) -> GradeSpec {
        self.min_percentage = Some(percentage);
        self
    }

    pub fn max_seconds_per_subregion(mut self, seconds: f64) -> GradeSpec {
        self.max_seconds_per_subregion = Some(seconds);
        self
    }

    fn achieved_by(&self, info: &GameInfo) -> bool {
        let score_ok = self
            .min_percentage
            .map_or(true, |min| info.correct_percentage >= min);
        let time_ok = self.max_seconds_per_subregion.map_or(true, |limit| {
            info.seconds as f64 <= info.num_subregions as f64 * limit
        });
        score_ok && time_ok
    }
}

/// Grades ordered best first. The last entry is the grade given when
/// nothing else is earned.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GradeTable {
    pub grades: Vec<GradeSpec>,
}

impl GradeTable {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<GradeTable, QuizError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| QuizError::io(path, err))?;
        let table: GradeTable =
            serde_json::from_str(&json).map_err(|err| QuizError::json(path, err))?;
        info!("Loaded {} grades from {:?}", table.grades.len(), path);
        Ok(table)
    }
}

impl Default for GradeTable {
    fn default() -> GradeTable {
        GradeTable {
            grades: vec![
                GradeSpec::new("S+", "Ambassador")
                    .min_percentage(100.0)
                    .max_seconds_per_subregion(3.0),
                GradeSpec::new("S", "Diplomat")
                    .min_percentage(95.0)
                    .max_seconds_per_subregion(5.0),
                GradeSpec::new("A", "Explorer")
                    .min_percentage(90.0)
                    .max_seconds_per_subregion(8.0),
                GradeSpec::new("B", "Navigator")
                    .min_percentage(80.0)
                    .max_seconds_per_subregion(12.0),
                GradeSpec::new("C", "Traveler").min_percentage(70.0),
                GradeSpec::new("D", "Backpacker").min_percentage(50.0),
                GradeSpec::new("F", "Tourist"),
            ],
        }
    }
}

/// Grade earned by a game, and what the next grade up would have taken.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GradeInfo {
    pub grade: String,
    pub next_grade: Option<String>,
    pub score_req: Option<f64>,
    // Total seconds allowed for the whole game at the next grade
    pub time_req: Option<f64>,
    pub rank: String,
}

#[derive(Debug)]
pub struct Grader {
    table: GradeTable,
    indices: HashMap<String, usize>,
}

impl Grader {
    pub fn new(table: GradeTable) -> Result<Grader, QuizError> {
        if table.grades.is_empty() {
            return Err(QuizError::InvalidGradeTable(
                "at least one grade is required".to_string(),
            ));
        }
        let mut indices = HashMap::with_capacity(table.grades.len());
        for (i, spec) in table.grades.iter().enumerate() {
            if indices.insert(spec.grade.clone(), i).is_some() {
                return Err(QuizError::InvalidGradeTable(format!(
                    "grade {:?} listed twice",
                    spec.grade
                )));
            }
        }
        Ok(Grader { table, indices })
    }

    pub fn calc_grade(&self, info: &GameInfo) -> GradeInfo {
        let grades = &self.table.grades;
        let index = grades
            .iter()
            .position(|spec| spec.achieved_by(info))
            .unwrap_or(grades.len() - 1);
        let earned = &grades[index];
        let next = if index == 0 {
            None
        } else {
            Some(&grades[index - 1])
        };
        debug!("Graded {:?} as {}", info, earned.grade);
        GradeInfo {
            grade: earned.grade.clone(),
            next_grade: next.map(|spec| spec.grade.clone()),
            score_req: next.and_then(|spec| spec.min_percentage),
            time_req: next
                .and_then(|spec| spec.max_seconds_per_subregion)
                .map(|limit| limit * info.num_subregions as f64),
            rank: earned.rank.clone(),
        }
    }

    fn spec(&self, grade: &str) -> Option<&GradeSpec> {
        self.indices.get(grade).map(|&i| &self.table.grades[i])
    }

    pub fn rank(&self, grade: &str) -> Option<&str> {
        self.spec(grade).map(|spec| spec.rank.as_str())
    }

    pub fn score_req(&self, grade: &str) -> Option<f64> {
        self.spec(grade).and_then(|spec| spec.min_percentage)
    }

    /// Seconds allowed per subregion for `grade`.
    pub fn time_req(&self, grade: &str) -> Option<f64> {
        self.spec(grade)
            .and_then(|spec| spec.max_seconds_per_subregion)
    }

    pub fn next_grade(&self, grade: &str) -> Option<&str> {
        match self.indices.get(grade) {
            Some(&i) if i > 0 => Some(self.table.grades[i - 1].grade.as_str()),
            _ => None,
        }
    }

    /// The better of two grades. Grades missing from the table lose to any
    /// listed grade.
    pub fn max<'a>(&self, a: &'a str, b: &'a str) -> &'a str {
        match (self.indices.get(a), self.indices.get(b)) {
            (Some(ia), Some(ib)) if ia < ib => a,
            (Some(_), None) => a,
            _ => b,
        }
    }

    pub fn grades(&self) -> &[GradeSpec] {
        &self.table.grades
    }
}
