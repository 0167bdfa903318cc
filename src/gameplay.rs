use std::collections::{HashMap, HashSet};
use std::time::{Duration, SystemTime};

use crate::card::{Card, CardId, GameType, QuizMode};
use crate::clock::Clock;
use crate::deck::CardDeck;

/// Statistics of a game, as handed to the grader.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GameInfo {
    pub num_subregions: usize,
    // Rounded up to hundredths, 0 before the first attempt
    pub correct_percentage: f64,
    // Play time net of completed pauses
    pub seconds: u64,
    pub correct: u32,
    pub incorrect: u32,
}

#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CheckOutcome {
    pub correct: bool,
    pub victory: bool,
}

#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SkipOutcome {
    pub victory: bool,
}

/// One player's game in progress.
///
/// A session is inert data between requests: it is loaded from the store,
/// has a single operation applied, and is written back. Every field survives
/// a serde round trip.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GameplaySession {
    region_path: String,
    game_type: GameType,
    deck: CardDeck,
    // Cards answered correctly or skipped
    consumed: HashSet<CardId>,
    num_subregions: usize,
    remaining: usize,
    // Sum of completed pauses
    pause_time: Duration,
    last_pause: Option<SystemTime>,
    start: Option<SystemTime>,
    attempts: u32,
    correct: u32,
}

impl GameplaySession {
    pub fn new<S: Into<String>>(
        region_path: S,
        game_type: GameType,
        deck: CardDeck,
    ) -> GameplaySession {
        let num_cards = deck.len();
        GameplaySession {
            region_path: region_path.into(),
            game_type,
            deck,
            consumed: HashSet::new(),
            num_subregions: num_cards,
            remaining: num_cards,
            pause_time: Duration::from_secs(0),
            last_pause: None,
            start: None,
            attempts: 0,
            correct: 0,
        }
    }

    pub fn start<C: Clock + ?Sized>(&mut self, clock: &C) {
        let now = clock.now();
        debug!("Starting {} game of {:?}", self.deck.mode(), self.region_path);
        self.start = Some(now);
    }

    /// Commits a guess that `card_id` belongs to `subregion_id`.
    pub fn check(&mut self, card_id: &str, subregion_id: &str) -> CheckOutcome {
        self.attempts += 1;
        let correct = self.matches(card_id, subregion_id);
        if correct {
            self.consumed.insert(card_id.to_string());
            self.correct += 1;
            self.remaining = self.remaining.saturating_sub(1);
        }
        trace!(
            "check {} against {}: {} ({} remaining)",
            card_id,
            subregion_id,
            correct,
            self.remaining
        );
        CheckOutcome {
            correct,
            victory: self.is_over(),
        }
    }

    /// Same answer as `check` would give, without recording anything.
    pub fn verify(&self, card_id: &str, subregion_id: &str) -> bool {
        self.matches(card_id, subregion_id)
    }

    pub fn skip(&mut self, card_id: &str) -> SkipOutcome {
        if self.deck.content(card_id).is_some() {
            self.consumed.insert(card_id.to_string());
        } else {
            warn!("Skipping unknown card {:?}", card_id);
        }
        self.attempts += 1;
        self.remaining = self.remaining.saturating_sub(1);
        trace!("skip {} ({} remaining)", card_id, self.remaining);
        SkipOutcome {
            victory: self.is_over(),
        }
    }

    pub fn pause<C: Clock + ?Sized>(&mut self, clock: &C) {
        if self.last_pause.is_none() {
            debug!("Pausing game of {:?}", self.region_path);
            self.last_pause = Some(clock.now());
        }
    }

    pub fn unpause<C: Clock + ?Sized>(&mut self, clock: &C) {
        if let Some(paused_at) = self.last_pause.take() {
            let paused_for = clock
                .now()
                .duration_since(paused_at)
                .unwrap_or_else(|_| Duration::from_secs(0));
            debug!("Unpausing game of {:?} after {:?}", self.region_path, paused_for);
            self.pause_time += paused_for;
        }
    }

    pub fn is_over(&self) -> bool {
        self.remaining == 0
    }

    pub fn summary<C: Clock + ?Sized>(&self, clock: &C) -> GameInfo {
        GameInfo {
            num_subregions: self.num_subregions,
            correct_percentage: correct_percentage(self.correct, self.attempts),
            seconds: self.elapsed(clock.now()).as_secs(),
            correct: self.correct,
            incorrect: self.attempts - self.correct,
        }
    }

    fn elapsed(&self, now: SystemTime) -> Duration {
        let start = match self.start {
            Some(start) => start,
            None => return Duration::from_secs(0),
        };
        let wall = now
            .duration_since(start)
            .unwrap_or_else(|_| Duration::from_secs(0));
        wall.checked_sub(self.pause_time)
            .unwrap_or_else(|| Duration::from_secs(0))
    }

    // Content of a card still in play; consumed cards have none and so can
    // never match again.
    fn open_content(&self, card_id: &str) -> Option<&str> {
        if self.consumed.contains(card_id) {
            return None;
        }
        self.deck.content(card_id)
    }

    fn matches(&self, card_id: &str, subregion_id: &str) -> bool {
        match self.open_content(card_id) {
            Some(content) => self
                .deck
                .accepted_contents(subregion_id)
                .iter()
                .any(|accepted| accepted == content),
            None => false,
        }
    }

    pub fn subregion_name_for_card(&self, card_id: &str) -> Option<&str> {
        self.deck.subregion_name_for_card(card_id)
    }

    pub fn subregion_id_for_card(&self, card_id: &str) -> Option<&str> {
        self.subregion_name_for_card(card_id)
            .and_then(|name| self.deck.subregion_id(name))
    }

    pub fn subregion_id(&self, subregion_name: &str) -> Option<&str> {
        self.deck.subregion_id(subregion_name)
    }

    /// Every subregion of the region, cards or not, with its opaque id.
    pub fn subregion_ids(&self) -> &HashMap<String, String> {
        self.deck.subregion_name_to_id()
    }

    /// All cards, in play order.
    pub fn cards(&self) -> &[Card] {
        self.deck.cards()
    }

    pub fn open_cards<'a>(&'a self) -> impl Iterator<Item = &'a Card> + 'a {
        self.deck
            .cards()
            .iter()
            .filter(move |card| !self.consumed.contains(&card.id))
    }

    pub fn region_path(&self) -> &str {
        &self.region_path
    }

    pub fn mode(&self) -> QuizMode {
        self.deck.mode()
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.last_pause.is_some()
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn pause_time(&self) -> Duration {
        self.pause_time
    }
}

fn correct_percentage(correct: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    // ceil(10000 * correct / attempts) in integers, then back to percent
    let basis_points = (10_000 * u64::from(correct) + u64::from(attempts) - 1) / u64::from(attempts);
    basis_points as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::deck::build_deck_with_rng;
    use crate::grader::{GradeSpec, GradeTable, Grader};
    use crate::region::Subregion;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Debug)]
    enum Event {
        Start,
        Advance(Duration),
        // (card of subregion, guessed subregion, expected correct)
        Check(&'static str, &'static str, bool),
        Verify(&'static str, &'static str, bool),
        Skip(&'static str),
        Pause,
        Unpause,
        Expect {
            remaining: usize,
            attempts: u32,
            correct: u32,
            over: bool,
        },
    }

    fn session_for(names: &[&str], seed: u64) -> GameplaySession {
        let subregions: Vec<Subregion> = names.iter().map(|n| Subregion::named(*n)).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let deck = build_deck_with_rng(&subregions, QuizMode::Name, "letters", &mut rng);
        GameplaySession::new("letters", GameType::Test, deck)
    }

    fn card_for(session: &GameplaySession, subregion: &str) -> CardId {
        session
            .cards()
            .iter()
            .find(|card| card.subregion_name == subregion)
            .expect("card for subregion")
            .id
            .clone()
    }

    fn id_for(session: &GameplaySession, subregion: &str) -> String {
        session.subregion_id(subregion).unwrap_or("no-such-subregion").to_string()
    }

    fn execute_data_driven_test(session: &mut GameplaySession, clock: &ManualClock, events: &[Event]) {
        for (i, event) in events.iter().enumerate() {
            match *event {
                Event::Start => session.start(clock),
                Event::Advance(by) => clock.advance(by),
                Event::Check(card, guess, expected) => {
                    let card_id = card_for(session, card);
                    let subregion_id = id_for(session, guess);
                    let outcome = session.check(&card_id, &subregion_id);
                    assert_eq!(outcome.correct, expected, "Row {} of test data", i);
                    assert_eq!(outcome.victory, session.is_over(), "Row {} of test data", i);
                }
                Event::Verify(card, guess, expected) => {
                    let card_id = card_for(session, card);
                    let subregion_id = id_for(session, guess);
                    assert_eq!(session.verify(&card_id, &subregion_id), expected, "Row {} of test data", i);
                }
                Event::Skip(card) => {
                    let card_id = card_for(session, card);
                    let outcome = session.skip(&card_id);
                    assert_eq!(outcome.victory, session.is_over(), "Row {} of test data", i);
                }
                Event::Pause => session.pause(clock),
                Event::Unpause => session.unpause(clock),
                Event::Expect {
                    remaining,
                    attempts,
                    correct,
                    over,
                } => {
                    assert_eq!(session.remaining(), remaining, "Row {} remaining", i);
                    assert_eq!(session.attempts(), attempts, "Row {} attempts", i);
                    assert_eq!(session.correct(), correct, "Row {} correct", i);
                    assert_eq!(session.is_over(), over, "Row {} over", i);
                }
            }
        }
    }

    fn sample_grader() -> Grader {
        Grader::new(GradeTable {
            grades: vec![
                GradeSpec::new("S", "Ambassador").min_percentage(90.0).max_seconds_per_subregion(5.0),
                GradeSpec::new("A", "Consul").min_percentage(70.0),
                GradeSpec::new("F", "Tourist"),
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_full_game() {
        let clock = ManualClock::new(SystemTime::now());
        let mut session = session_for(&["A", "B", "C", "D"], 1);
        let second = Duration::from_secs(1);

        let events = vec![
            Event::Expect { remaining: 4, attempts: 0, correct: 0, over: false },
            Event::Start,
            Event::Advance(second * 3),
            Event::Check("A", "A", true),
            Event::Expect { remaining: 3, attempts: 1, correct: 1, over: false },
            // Already answered
            Event::Check("A", "A", false),
            Event::Expect { remaining: 3, attempts: 2, correct: 1, over: false },
            Event::Skip("B"),
            Event::Expect { remaining: 2, attempts: 3, correct: 1, over: false },
            Event::Check("C", "D", false),
            Event::Skip("C"),
            Event::Advance(second * 2),
            Event::Skip("D"),
            Event::Expect { remaining: 0, attempts: 6, correct: 1, over: true },
        ];
        execute_data_driven_test(&mut session, &clock, &events);

        let info = session.summary(&clock);
        assert_eq!(info.num_subregions, 4);
        assert_eq!(info.correct, 1);
        assert_eq!(info.incorrect, 5);
        assert_eq!(info.seconds, 5);
        assert_approx_eq!(info.correct_percentage, 16.67);

        let grade = sample_grader().calc_grade(&info);
        assert_eq!(grade.grade, "F");
        assert_eq!(grade.next_grade, Some("A".to_string()));
        assert_eq!(grade.rank, "Tourist");
    }

    #[test]
    fn test_verify_does_not_mutate() {
        let clock = ManualClock::new(SystemTime::now());
        let mut session = session_for(&["A", "B", "C"], 2);
        let events = vec![
            Event::Start,
            Event::Verify("A", "A", true),
            Event::Verify("A", "B", false),
            Event::Expect { remaining: 3, attempts: 0, correct: 0, over: false },
            Event::Check("A", "A", true),
            Event::Verify("A", "A", false),
            Event::Expect { remaining: 2, attempts: 1, correct: 1, over: false },
        ];
        execute_data_driven_test(&mut session, &clock, &events);
    }

    #[test]
    fn test_unknown_ids_never_match() {
        let mut session = session_for(&["A", "B"], 3);
        let card = card_for(&session, "A");
        assert!(!session.verify(&card, "subregion_99"));
        assert_eq!(
            session.check(&card, "subregion_99"),
            CheckOutcome { correct: false, victory: false }
        );
        assert!(!session.check("gameplay-card-42", &id_for(&session, "A")).correct);
        assert_eq!(session.attempts(), 2);
        assert_eq!(session.remaining(), 2);
    }

    #[test]
    fn test_skip_never_counts_as_correct() {
        let mut session = session_for(&["A", "B"], 4);
        let a = card_for(&session, "A");
        assert_eq!(session.skip(&a), SkipOutcome { victory: false });
        assert_eq!(session.correct(), 0);
        // A skipped card can no longer be answered
        assert!(!session.check(&a, &id_for(&session, "A")).correct);
        let b = card_for(&session, "B");
        assert_eq!(session.skip(&b), SkipOutcome { victory: true });
        assert_eq!(session.attempts(), 3);
        // Remaining bottoms out at zero
        session.skip(&b);
        assert_eq!(session.remaining(), 0);
        assert!(session.is_over());
    }

    #[test]
    fn test_pause_time_is_not_played_time() {
        let clock = ManualClock::new(SystemTime::now());
        let mut session = session_for(&["A", "B"], 5);
        let second = Duration::from_secs(1);

        let events = vec![
            Event::Start,
            Event::Advance(second * 10),
            Event::Pause,
            Event::Advance(second * 30),
            // Second pause must not restart the pause clock
            Event::Pause,
            Event::Advance(second * 10),
            Event::Unpause,
            Event::Unpause,
            Event::Advance(second * 20),
            Event::Pause,
            Event::Advance(second * 5),
            Event::Unpause,
        ];
        execute_data_driven_test(&mut session, &clock, &events);

        assert!(!session.is_paused());
        assert_eq!(session.pause_time(), second * 45);
        assert_eq!(session.summary(&clock).seconds, 30);
    }

    #[test]
    fn test_summary_edge_cases() {
        let clock = ManualClock::new(SystemTime::now());
        let mut session = session_for(&["A", "B", "C"], 6);

        let info = session.summary(&clock);
        assert_eq!(info.seconds, 0);
        assert_approx_eq!(info.correct_percentage, 0.0);

        session.start(&clock);
        clock.advance(Duration::from_millis(2999));
        assert_eq!(session.summary(&clock).seconds, 2);

        let a = card_for(&session, "A");
        let b = card_for(&session, "B");
        session.check(&a, &id_for(&session, "A"));
        session.check(&b, &id_for(&session, "A"));
        session.check(&b, &id_for(&session, "B"));
        // 2 of 3 rounds up to 66.67
        assert_approx_eq!(session.summary(&clock).correct_percentage, 66.67);
    }

    #[test]
    fn test_correct_percentage_rounds_up() {
        assert_approx_eq!(correct_percentage(1, 3), 33.34);
        assert_approx_eq!(correct_percentage(7, 10), 70.0);
        assert_approx_eq!(correct_percentage(5, 5), 100.0);
        assert_approx_eq!(correct_percentage(0, 4), 0.0);
    }

    #[test]
    fn test_lookups() {
        let session = session_for(&["A", "B", "C"], 7);
        let c = card_for(&session, "C");
        assert_eq!(session.subregion_name_for_card(&c), Some("C"));
        assert_eq!(session.subregion_id_for_card(&c), session.subregion_id("C"));
        assert_eq!(session.subregion_name_for_card("nope"), None);
        assert_eq!(session.subregion_id_for_card("nope"), None);
    }

    #[test]
    fn test_open_cards_shrink() {
        let mut session = session_for(&["A", "B", "C"], 8);
        assert_eq!(session.open_cards().count(), 3);
        let b = card_for(&session, "B");
        session.skip(&b);
        let open: Vec<&str> = session.open_cards().map(|c| c.subregion_name.as_str()).collect();
        assert_eq!(open.len(), 2);
        assert!(!open.contains(&"B"));
        assert_eq!(session.cards().len(), 3);
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let clock = ManualClock::new(SystemTime::now());
        let mut session = session_for(&["A", "B", "C", "D"], 9);
        session.start(&clock);
        clock.advance(Duration::from_secs(4));
        let a = card_for(&session, "A");
        session.check(&a, &id_for(&session, "A"));
        session.skip(&card_for(&session, "B"));
        session.pause(&clock);

        let json = serde_json::to_string(&session).unwrap();
        let restored: GameplaySession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
        assert!(restored.is_paused());
        assert!(!restored.verify(&a, &id_for(&restored, "A")));
        assert_eq!(restored.summary(&clock), session.summary(&clock));
    }
}
