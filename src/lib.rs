pub mod checksum;
pub mod convert;
pub mod crypto;
pub mod data;
pub mod error;
pub mod exp;
pub mod record;
pub mod ribbon;
pub mod tables;
pub mod text;
pub mod types;

pub use convert::{convert, convert_chain, DestinationContext};
pub use data::{GameData, NoData, PersonalInfo, StaticGameData};
pub use error::{DataError, RecordError};
pub use exp::GrowthRate;
pub use record::{detect, empty, from_bytes, from_slice, Creature, Record, RecordBuf};
pub use record::{Pb7, Pk3, Pk4, Pk5, Pk6, Pk7, Pk8};
pub use ribbon::Ribbon;
pub use types::{
    Ability, Ball, GameVersion, Gender, Generation, Item, Language, Move, Nature, RecordMode,
    Species, Stat,
};
