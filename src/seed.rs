//! Initial data: the administrator account and a handful of sample cards

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::models::{Card, CardDraft, Condition, ConditionGrade, User, ValidationError};
use crate::password::hash_password;
use crate::repo;

pub const ADMIN_EMAIL: &str = "admin@cardwise.com";
const ADMIN_PASSWORD: &str = "admin123";
const PLACEHOLDER_IMAGE: &str = "/api/placeholder/250/350";

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Admin user not found. Please seed admin user first.")]
    AdminMissing,
    #[error("Invalid sample card: {0}")]
    InvalidSample(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Public view of the seeded administrator
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeededUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl From<&User> for SeededUser {
    fn from(user: &User) -> Self {
        Self {
            email: user.get_email().to_string(),
            first_name: user.get_first_name().to_string(),
            last_name: user.get_last_name().to_string(),
            role: user.get_role().to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AdminSeedResult {
    pub success: bool,
    pub message: String,
    pub user: SeededUser,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeededCard {
    #[serde(rename = "_id")]
    pub id: String,
    pub player_name: String,
    pub sport: String,
    pub year: i32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardSeedResult {
    pub success: bool,
    pub message: String,
    pub cards_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<SeededCard>>,
}

/// Looks up the administrator account
pub fn find_admin_user(pool: &DbPool) -> anyhow::Result<Option<User>> {
    repo::get_user_by_email(pool, ADMIN_EMAIL)
}

/// Returns the administrator, creating it first if needed
///
/// The flag is true when the account was created by this call.
#[instrument(skip(pool))]
pub fn ensure_admin_user(pool: &DbPool) -> anyhow::Result<(User, bool)> {
    if let Some(admin) = find_admin_user(pool)? {
        return Ok((admin, false));
    }

    let admin = User::new(ADMIN_EMAIL, hash_password(ADMIN_PASSWORD)?, "Admin", "User", "admin");
    let admin = repo::create_user(pool, admin)?;
    info!("Admin user created: {}", admin.get_email());
    Ok((admin, true))
}

/// Creates the administrator account unless it exists
pub fn seed_admin_user(pool: &DbPool) -> Result<AdminSeedResult, SeedError> {
    let (admin, created) = ensure_admin_user(pool)?;
    let message = if created {
        "Admin user created successfully"
    } else {
        info!("Admin user already exists, skipping seeding");
        "Admin user already exists"
    };

    Ok(AdminSeedResult {
        success: true,
        message: message.to_string(),
        user: SeededUser::from(&admin),
    })
}

/// Gives the administrator five well-known sample cards
///
/// Does nothing if the administrator already owns any card.
///
/// ### Errors
///
/// `SeedError::AdminMissing` when the administrator has not been seeded
#[instrument(skip(pool))]
pub fn seed_sample_cards(pool: &DbPool) -> Result<CardSeedResult, SeedError> {
    let admin = find_admin_user(pool)?.ok_or(SeedError::AdminMissing)?;

    let existing = repo::count_cards(pool, &admin.get_id())?;
    if existing > 0 {
        info!("{} cards already exist for admin user, skipping seeding", existing);
        return Ok(CardSeedResult {
            success: true,
            message: format!("{} cards already exist", existing),
            cards_count: existing,
            cards: None,
        });
    }

    let cards = sample_drafts()
        .into_iter()
        .map(|draft| Ok(Card::new(admin.get_id(), draft.validate()?)))
        .collect::<Result<Vec<_>, ValidationError>>()?;
    let inserted = repo::create_cards(pool, &cards)?;
    info!("Successfully created {} sample cards", inserted);

    Ok(CardSeedResult {
        success: true,
        message: format!("Successfully created {} sample cards", inserted),
        cards_count: inserted as i64,
        cards: Some(
            cards
                .iter()
                .map(|card| SeededCard {
                    id: card.get_id(),
                    player_name: card.get_player_name().to_string(),
                    sport: card.get_sport().to_string(),
                    year: card.get_year(),
                })
                .collect(),
        ),
    })
}

struct Sample {
    player: &'static str,
    sport: &'static str,
    year: i32,
    manufacturer: &'static str,
    set_name: &'static str,
    number: &'static str,
    scores: [i32; 4],
    overall: ConditionGrade,
    flags: [bool; 3],
    values: [f64; 2],
    tags: &'static [&'static str],
    notes: &'static str,
}

const SAMPLES: [Sample; 5] = [
    Sample {
        player: "Mike Trout",
        sport: "Baseball",
        year: 2009,
        manufacturer: "Topps",
        set_name: "Bowman Chrome",
        number: "BC1",
        scores: [9, 9, 8, 9],
        overall: ConditionGrade::NearMint,
        flags: [true, false, false],
        values: [2500.0, 2650.0],
        tags: &["rookie", "chrome", "angels"],
        notes: "Excellent condition rookie card",
    },
    Sample {
        player: "LeBron James",
        sport: "Basketball",
        year: 2003,
        manufacturer: "Upper Deck",
        set_name: "Exquisite Collection",
        number: "RC23",
        scores: [10, 9, 9, 10],
        overall: ConditionGrade::Mint,
        flags: [true, true, true],
        values: [15000.0, 16500.0],
        tags: &["rookie", "autograph", "patch", "lakers"],
        notes: "Rare rookie patch autograph",
    },
    Sample {
        player: "Tom Brady",
        sport: "Football",
        year: 2000,
        manufacturer: "Playoff Contenders",
        set_name: "Championship Ticket",
        number: "144",
        scores: [8, 8, 9, 8],
        overall: ConditionGrade::NearMint,
        flags: [true, true, false],
        values: [8500.0, 9200.0],
        tags: &["rookie", "autograph", "patriots", "goat"],
        notes: "Iconic rookie autograph",
    },
    Sample {
        player: "Wayne Gretzky",
        sport: "Hockey",
        year: 1979,
        manufacturer: "O-Pee-Chee",
        set_name: "O-Pee-Chee",
        number: "18",
        scores: [7, 7, 8, 8],
        overall: ConditionGrade::VeryGood,
        flags: [true, false, false],
        values: [12000.0, 13500.0],
        tags: &["rookie", "hockey", "gretzky", "oilers"],
        notes: "The Great One rookie card",
    },
    Sample {
        player: "Michael Jordan",
        sport: "Basketball",
        year: 1986,
        manufacturer: "Fleer",
        set_name: "Fleer Basketball",
        number: "57",
        scores: [8, 7, 8, 9],
        overall: ConditionGrade::VeryGood,
        flags: [true, false, false],
        values: [25000.0, 28000.0],
        tags: &["rookie", "jordan", "bulls", "goat"],
        notes: "Holy grail of basketball cards",
    },
];

fn sample_drafts() -> Vec<CardDraft> {
    SAMPLES
        .iter()
        .map(|s| {
            let [centering, corners, edges, surface] = s.scores;
            let [is_rookie_card, is_autograph, is_memorabilia] = s.flags;
            let [estimated_value, market_value] = s.values;
            CardDraft {
                player_name: Some(s.player.to_string()),
                sport: Some(s.sport.to_string()),
                year: Some(s.year),
                manufacturer: Some(s.manufacturer.to_string()),
                set_name: Some(s.set_name.to_string()),
                card_number: Some(s.number.to_string()),
                front_image: Some(PLACEHOLDER_IMAGE.to_string()),
                back_image: Some(PLACEHOLDER_IMAGE.to_string()),
                condition: Some(Condition { centering, corners, edges, surface, overall: s.overall }),
                is_rookie_card,
                is_autograph,
                is_memorabilia,
                estimated_value,
                market_value,
                tags: s.tags.iter().map(|t| t.to_string()).collect(),
                notes: s.notes.to_string(),
                lot_number: None,
                is_for_trade: false,
            }
        })
        .collect()
}
