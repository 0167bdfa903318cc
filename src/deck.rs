use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::card::{Card, CardId, QuizMode};
use crate::region::Subregion;

/// The cards of one game plus the lookups needed to score answers.
///
/// Subregion ids are opaque `subregion_<n>` tokens shuffled independently of
/// the card order, so neither card ids nor subregion ids say anything about
/// which subregion a card belongs to.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CardDeck {
    mode: QuizMode,
    // In play order
    cards: Vec<Card>,
    card_id_to_content: HashMap<CardId, String>,
    card_id_to_subregion_name: HashMap<CardId, String>,
    // A subregion may accept several contents (one per landmark)
    subregion_id_to_content: HashMap<String, Vec<String>>,
    subregion_name_to_id: HashMap<String, String>,
    subregion_count: usize,
}

impl CardDeck {
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of subregions the deck was built from, which can exceed
    /// `len()` in landmark games.
    pub fn subregion_count(&self) -> usize {
        self.subregion_count
    }

    pub fn content(&self, card_id: &str) -> Option<&str> {
        self.card_id_to_content.get(card_id).map(|c| c.as_str())
    }

    pub fn subregion_name_for_card(&self, card_id: &str) -> Option<&str> {
        self.card_id_to_subregion_name
            .get(card_id)
            .map(|name| name.as_str())
    }

    pub fn subregion_id(&self, subregion_name: &str) -> Option<&str> {
        self.subregion_name_to_id
            .get(subregion_name)
            .map(|id| id.as_str())
    }

    /// Contents that count as a correct answer for the subregion.
    pub fn accepted_contents(&self, subregion_id: &str) -> &[String] {
        self.subregion_id_to_content
            .get(subregion_id)
            .map(|contents| contents.as_slice())
            .unwrap_or(&[])
    }

    pub fn subregion_name_to_id(&self) -> &HashMap<String, String> {
        &self.subregion_name_to_id
    }
}

pub fn build_deck(subregions: &[Subregion], mode: QuizMode, region_path: &str) -> CardDeck {
    build_deck_with_rng(subregions, mode, region_path, &mut rand::thread_rng())
}

pub fn build_deck_with_rng<R: Rng + ?Sized>(
    subregions: &[Subregion],
    mode: QuizMode,
    region_path: &str,
    rng: &mut R,
) -> CardDeck {
    let mut cards = generate_cards(subregions, mode, region_path, rng);

    // Ids follow generation order; the shuffle below hides it.
    let mut card_id_to_content = HashMap::with_capacity(cards.len());
    let mut card_id_to_subregion_name = HashMap::with_capacity(cards.len());
    for (i, card) in cards.iter_mut().enumerate() {
        card.id = format!("gameplay-card-{}", i);
        card_id_to_content.insert(card.id.clone(), card.content.clone());
        card_id_to_subregion_name.insert(card.id.clone(), card.subregion_name.clone());
    }
    cards.shuffle(rng);

    let mut ids: Vec<String> = (0..subregions.len())
        .map(|i| format!("subregion_{}", i))
        .collect();
    ids.shuffle(rng);
    let subregion_name_to_id: HashMap<String, String> = subregions
        .iter()
        .zip(ids.into_iter())
        .map(|(subregion, id)| (subregion.name.clone(), id))
        .collect();

    let mut subregion_id_to_content: HashMap<String, Vec<String>> = HashMap::new();
    for card in &cards {
        // Every card's subregion came from `subregions`, so it has an id.
        if let Some(id) = subregion_name_to_id.get(&card.subregion_name) {
            subregion_id_to_content
                .entry(id.clone())
                .or_insert_with(Vec::new)
                .push(card.content.clone());
        }
    }

    debug!(
        "Built {} deck of {} cards from {} subregions of {:?}",
        mode,
        cards.len(),
        subregions.len(),
        region_path
    );

    CardDeck {
        mode,
        cards,
        card_id_to_content,
        card_id_to_subregion_name,
        subregion_id_to_content,
        subregion_name_to_id,
        subregion_count: subregions.len(),
    }
}

fn card(subregion: &Subregion, content: String) -> Card {
    Card {
        id: CardId::new(),
        subregion_name: subregion.name.clone(),
        content,
        img_url: None,
    }
}

fn generate_cards<R: Rng + ?Sized>(
    subregions: &[Subregion],
    mode: QuizMode,
    region_path: &str,
    rng: &mut R,
) -> Vec<Card> {
    let mut cards: Vec<Card> = match mode {
        QuizMode::Name => subregions
            .iter()
            .map(|s| card(s, s.name.clone()))
            .collect(),
        QuizMode::Capital => subregions
            .iter()
            .map(|s| card(s, s.capital.clone().unwrap_or_default()))
            .collect(),
        QuizMode::Leader => subregions
            .iter()
            .map(|s| card(s, s.leader.clone().unwrap_or_default()))
            .collect(),
        QuizMode::Flag => subregions
            .iter()
            .map(|s| Card {
                img_url: Some(format!("/{}/{} Flag.png", region_path, s.name)),
                ..card(s, s.name.clone())
            })
            .collect(),
        QuizMode::Landmarks => subregions
            .iter()
            .flat_map(|s| s.landmarks.iter().map(move |l| card(s, l.clone())))
            .collect(),
    };
    cards.shuffle(rng);
    // Landmark games are capped at one card per subregion. Truncating after
    // the shuffle keeps a random subset.
    if cards.len() > subregions.len() {
        cards.truncate(subregions.len());
    }
    cards
}
