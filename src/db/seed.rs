//! Embedded catalog seed data.
//!
//! The original deployment imported races, classes, abilities, equipment and
//! monsters from the dnd5eapi; here the catalog is embedded and inserted
//! idempotently at startup. User registration requires the "human" race and
//! "barbarian" class to exist, so seeding is not optional.

use sqlx::SqlitePool;

const RACES: &[(&str, &str, i32, &str, &str, &str)] = &[
    (
        "dragonborn",
        "Dragonborn",
        30,
        "lawful good",
        "Medium",
        "Dragonborn are taller and heavier than humans, standing well over 6 feet tall.",
    ),
    (
        "dwarf",
        "Dwarf",
        25,
        "lawful good",
        "Medium",
        "Dwarves stand between 4 and 5 feet tall and average about 150 pounds.",
    ),
    (
        "elf",
        "Elf",
        30,
        "chaotic good",
        "Medium",
        "Elves range from under 5 to over 6 feet tall and have slender builds.",
    ),
    (
        "gnome",
        "Gnome",
        25,
        "chaotic good",
        "Small",
        "Gnomes are between 3 and 4 feet tall and average about 40 pounds.",
    ),
    (
        "half-elf",
        "Half-Elf",
        30,
        "chaotic good",
        "Medium",
        "Half-elves are about the same size as humans, ranging from 5 to 6 feet tall.",
    ),
    (
        "half-orc",
        "Half-Orc",
        30,
        "chaotic neutral",
        "Medium",
        "Half-orcs are somewhat larger and bulkier than humans.",
    ),
    (
        "halfling",
        "Halfling",
        25,
        "lawful good",
        "Small",
        "Halflings average about 3 feet tall and weigh about 40 pounds.",
    ),
    (
        "human",
        "Human",
        30,
        "neutral",
        "Medium",
        "Humans vary widely in height and build, from barely 5 feet to well over 6 feet tall.",
    ),
    (
        "tiefling",
        "Tiefling",
        30,
        "chaotic neutral",
        "Medium",
        "Tieflings are about the same size and build as humans.",
    ),
];

const CLASSES: &[(&str, &str, i32, &[&str])] = &[
    ("barbarian", "Barbarian", 12, &["Athletics", "Intimidation", "Survival"]),
    ("bard", "Bard", 8, &["Deception", "Performance", "Persuasion"]),
    ("cleric", "Cleric", 8, &["History", "Insight", "Medicine"]),
    ("druid", "Druid", 8, &["Animal Handling", "Nature", "Perception"]),
    ("fighter", "Fighter", 10, &["Acrobatics", "Athletics", "Intimidation"]),
    ("monk", "Monk", 8, &["Acrobatics", "Athletics", "Stealth"]),
    ("paladin", "Paladin", 10, &["Athletics", "Persuasion", "Religion"]),
    ("ranger", "Ranger", 10, &["Animal Handling", "Nature", "Stealth", "Survival"]),
    ("rogue", "Rogue", 8, &["Deception", "Sleight of Hand", "Stealth"]),
    ("sorcerer", "Sorcerer", 6, &["Arcana", "Deception", "Persuasion"]),
    ("warlock", "Warlock", 8, &["Arcana", "Deception", "Intimidation"]),
    ("wizard", "Wizard", 6, &["Arcana", "History", "Investigation"]),
];

const ABILITIES: &[(&str, &str)] = &[
    ("cha", "Charisma"),
    ("con", "Constitution"),
    ("dex", "Dexterity"),
    ("int", "Intelligence"),
    ("str", "Strength"),
    ("wis", "Wisdom"),
];

const EQUIPMENTS: &[(&str, &str, i32)] = &[
    ("battleaxe", "Battleaxe", 10),
    ("chain-mail", "Chain Mail", 75),
    ("club", "Club", 1),
    ("crossbow-light", "Crossbow, light", 25),
    ("dagger", "Dagger", 2),
    ("greataxe", "Greataxe", 30),
    ("greatsword", "Greatsword", 50),
    ("halberd", "Halberd", 20),
    ("handaxe", "Handaxe", 5),
    ("javelin", "Javelin", 1),
    ("leather-armor", "Leather Armor", 10),
    ("longbow", "Longbow", 50),
    ("longsword", "Longsword", 15),
    ("mace", "Mace", 5),
    ("maul", "Maul", 10),
    ("quarterstaff", "Quarterstaff", 1),
    ("rapier", "Rapier", 25),
    ("shield", "Shield", 10),
    ("shortbow", "Shortbow", 25),
    ("shortsword", "Shortsword", 10),
    ("spear", "Spear", 1),
    ("warhammer", "Warhammer", 15),
];

const MONSTERS: &[(&str, &str, &str, &str, i32)] = &[
    ("Adult Black Dragon", "Huge", "dragon", "chaotic evil", 195),
    ("Ancient Red Dragon", "Gargantuan", "dragon", "chaotic evil", 546),
    ("Banshee", "Medium", "undead", "chaotic evil", 58),
    ("Beholder", "Large", "aberration", "lawful evil", 180),
    ("Bugbear", "Medium", "humanoid", "chaotic evil", 27),
    ("Dire Wolf", "Large", "beast", "unaligned", 37),
    ("Gelatinous Cube", "Large", "ooze", "unaligned", 84),
    ("Ghoul", "Medium", "undead", "chaotic evil", 22),
    ("Goblin", "Small", "humanoid", "neutral evil", 7),
    ("Hill Giant", "Huge", "giant", "chaotic evil", 105),
    ("Kobold", "Small", "humanoid", "lawful evil", 5),
    ("Lich", "Medium", "undead", "neutral evil", 135),
    ("Mimic", "Medium", "monstrosity", "neutral", 58),
    ("Owlbear", "Large", "monstrosity", "unaligned", 59),
    ("Skeleton", "Medium", "undead", "lawful evil", 13),
    ("Troll", "Large", "giant", "chaotic evil", 84),
    ("Vampire", "Medium", "undead", "lawful evil", 144),
    ("Zombie", "Medium", "undead", "neutral evil", 22),
];

/// Insert catalog rows that are not present yet. Idempotent: existing rows
/// (matched on their stable slug or name) are left untouched.
pub async fn seed_catalog(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for (idx, name, speed, alignment, size, size_description) in RACES {
        sqlx::query(
            "INSERT OR IGNORE INTO races (id, idx, name, speed, alignment, size, size_description) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(idx)
        .bind(name)
        .bind(speed)
        .bind(alignment)
        .bind(size)
        .bind(size_description)
        .execute(pool)
        .await?;
    }

    for (idx, name, hit_die, skills) in CLASSES {
        let skills_json = serde_json::to_string(skills).unwrap_or_default();
        sqlx::query("INSERT OR IGNORE INTO classes (id, idx, name, hit_die, skills) VALUES (?, ?, ?, ?, ?)")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(idx)
            .bind(name)
            .bind(hit_die)
            .bind(&skills_json)
            .execute(pool)
            .await?;
    }

    for (idx, full_name) in ABILITIES {
        sqlx::query("INSERT OR IGNORE INTO abilities (id, idx, full_name) VALUES (?, ?, ?)")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(idx)
            .bind(full_name)
            .execute(pool)
            .await?;
    }

    for (idx, name, value) in EQUIPMENTS {
        sqlx::query("INSERT OR IGNORE INTO equipments (id, idx, name, value) VALUES (?, ?, ?, ?)")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(idx)
            .bind(name)
            .bind(value)
            .execute(pool)
            .await?;
    }

    for (name, size, type_, alignment, hit_points) in MONSTERS {
        sqlx::query(
            "INSERT OR IGNORE INTO monsters (id, name, size, type, alignment, hit_points, image) VALUES (?, ?, ?, ?, ?, ?, NULL)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(name)
        .bind(size)
        .bind(type_)
        .bind(alignment)
        .bind(hit_points)
        .execute(pool)
        .await?;
    }

    tracing::debug!(
        races = RACES.len(),
        classes = CLASSES.len(),
        monsters = MONSTERS.len(),
        "Catalog seed complete"
    );

    Ok(())
}
