//! Writes a gzip-compressed `level.dat` style file and reads it back.
//!
//! ```text
//! cargo run --example level [path]
//! ```

use std::{collections::BTreeMap, fs::File};

use shaped_nbt::{BigEndian, Config, decode_from_with, encode_to_with, nbt_record};

nbt_record! {
    #[derive(Debug, PartialEq)]
    struct Level {
        data: LevelData => "Data",
    }
}

nbt_record! {
    #[derive(Debug, PartialEq)]
    struct LevelData {
        name: String => "LevelName",
        version: i32 => "version",
        seed: i64 => "RandomSeed",
        spawn: Vec<i32> => "Spawn",
        hardcore: bool => "hardcore",
        game_rules: BTreeMap<String, String> => "GameRules",
        players: Vec<Player> => "Players",
    }
}

nbt_record! {
    #[derive(Debug, PartialEq)]
    struct Player {
        name: String => "Name",
        pos: Vec<f64> => "Pos",
        rotation: Vec<f32> => "Rotation",
        inventory: Vec<Slot> => "Inventory",
    }
}

nbt_record! {
    #[derive(Debug, PartialEq)]
    struct Slot {
        slot: i8 => "Slot",
        id: String,
        count: i8 => "Count",
    }
}

fn sample() -> Level {
    let mut game_rules = BTreeMap::new();
    game_rules.insert("doDaylightCycle".to_string(), "true".to_string());
    game_rules.insert("keepInventory".to_string(), "false".to_string());

    Level {
        data: LevelData {
            name: "New World".to_string(),
            version: 19133,
            seed: 8_675_309,
            spawn: vec![0, 72, 0],
            hardcore: false,
            game_rules,
            players: vec![Player {
                name: "Alex".to_string(),
                pos: vec![0.5, 72.0, 0.5],
                rotation: vec![90.0, 0.0],
                inventory: vec![
                    Slot {
                        slot: 0,
                        id: "minecraft:stone".to_string(),
                        count: 64,
                    },
                    Slot {
                        slot: 8,
                        id: "minecraft:torch".to_string(),
                        count: 16,
                    },
                ],
            }],
        },
    }
}

fn main() -> shaped_nbt::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(Into::into)
        .unwrap_or_else(|| std::env::temp_dir().join("level.dat"));
    let config = Config::default();
    let level = sample();

    encode_to_with::<BigEndian, _, _>(&level, File::create(&path)?, true, "", &config)?;
    println!("wrote {}", path.display());

    let (root, decoded) = decode_from_with::<BigEndian, Level, _>(File::open(&path)?, true, &config)?;
    println!("root name: {root:?}");
    println!("{:#?}", decoded.data);
    assert_eq!(decoded, level);
    Ok(())
}
