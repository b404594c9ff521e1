use chrono::NaiveDate;
use pkcodec::{
    convert, convert_chain, detect, empty, from_bytes, from_slice, Creature, DestinationContext, GameData,
    GameVersion, Gender, Generation, Language, Move, Nature, NoData, Record, RecordError, RecordMode, Ribbon, Species,
    StaticGameData,
};
use std::io::Write;
use tempfile::NamedTempFile;

const GAME_DATA: &str = r#"{
    "personal": [
        { "species": 1, "base_stats": [45, 49, 49, 45, 65, 65], "abilities": [65, 0, 34],
          "gender_ratio": 31, "growth_rate": "MediumSlow" },
        { "species": 25, "base_stats": [35, 55, 40, 90, 50, 50], "abilities": [9, 0, 31],
          "gender_ratio": 127, "growth_rate": "MediumFast" }
    ],
    "species_names": { "2": { "1": "Bulbasaur", "25": "Pikachu" } },
    "move_pp": { "33": 35, "45": 40, "84": 30 }
}"#;

fn ctx() -> DestinationContext {
    DestinationContext { today: NaiveDate::from_ymd_opt(2009, 9, 12), ..Default::default() }
}

fn game_data() -> StaticGameData {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GAME_DATA.as_bytes()).unwrap();
    StaticGameData::from_path(file.path()).unwrap()
}

fn bulbasaur_bytes() -> Vec<u8> {
    let mut pk = empty(Generation::III, RecordMode::Box);
    pk.set_pid(0x1234_5678);
    pk.set_tid(1);
    pk.set_sid(2);
    pk.set_species(Species::BULBASAUR);
    pk.set_exp(560);
    pk.set_language(Language::ENG);
    pk.set_version(GameVersion::FIRE_RED);
    pk.set_nickname("BULBASAUR");
    pk.set_ot_name("RED");
    pk.set_moves([Move(33), Move(45), Move::NONE, Move::NONE]);
    pk.refresh_checksum();
    pk.encrypted_bytes()
}

#[test]
fn test_pal_park_transfer() {
    let bytes = bulbasaur_bytes();
    assert_eq!(bytes.len(), 80);
    assert_eq!(hex::encode(&bytes[..8]), "7856341201000200");

    let data = game_data();
    let pk3 = from_bytes(Generation::III, &bytes, RecordMode::Box).unwrap();
    assert!(pk3.is_checksum_valid());
    assert_eq!(pk3.species(), Species::BULBASAUR);

    let pk4 = convert(&*pk3, Generation::IV, &ctx(), &data).unwrap();
    assert_eq!(pk4.generation(), Generation::IV);
    assert_eq!(pk4.species(), Species::BULBASAUR);
    assert_eq!(pk4.pid(), 0x1234_5678);
    assert_eq!(pk4.ot_friendship(), 70);
    assert_eq!(pk4.met_location(), 55);
    assert_eq!(pk4.met_level(), 10);
    assert_eq!(pk4.gender(), Some(Gender::Male));
    assert_eq!(pk4.nature(), pk3.nature());
    assert_eq!(pk4.nickname(), "BULBASAUR");
    assert!(!pk4.is_nicknamed());
    assert_eq!(pk4.ot_name(), "RED");
    assert_eq!((pk4.pp(0), pk4.pp(1)), (35, 40));
    assert!(pk4.is_checksum_valid());

    let stored = pk4.encrypted_bytes();
    assert_eq!(stored.len(), 136);
    let reread = from_bytes(Generation::IV, &stored, RecordMode::Box).unwrap();
    assert_eq!(reread.data(), pk4.data());
}

#[test]
fn test_nicknamed_gen3_keeps_name() {
    let mut pk3 = from_bytes(Generation::III, &bulbasaur_bytes(), RecordMode::Box).unwrap();
    pk3.set_nickname("BUDDY");
    pk3.refresh_checksum();
    let pk4 = convert(&*pk3, Generation::IV, &ctx(), &game_data()).unwrap();
    assert_eq!(pk4.nickname(), "BUDDY");
    assert!(pk4.is_nicknamed());
}

#[test]
fn test_effort_ribbon_survives_vi_to_vii() {
    let mut pk6 = empty(Generation::VI, RecordMode::Box);
    pk6.set_species(Species(25));
    pk6.set_encryption_constant(0x0BAD_F00D);
    pk6.set_pid(0x2222_1111);
    pk6.set_ribbon(Ribbon::Effort, true);
    pk6.refresh_checksum();

    let pk7 = convert(&*pk6, Generation::VII, &ctx(), &game_data()).unwrap();
    assert!(pk7.ribbon(Ribbon::Effort));
    assert_eq!(pk7.encryption_constant(), 0x0BAD_F00D);
    assert_eq!(pk7.pid(), 0x2222_1111);
    assert!(pk7.is_checksum_valid());
}

#[test]
fn test_chain_matches_single_steps() {
    let data = game_data();
    let pk3 = from_bytes(Generation::III, &bulbasaur_bytes(), RecordMode::Box).unwrap();

    let chained = convert_chain(&*pk3, Generation::VIII, &ctx(), &data).unwrap();

    let mut current: Record<'static> = pk3.clone_owned();
    for next in [Generation::IV, Generation::V, Generation::VI, Generation::VII, Generation::VIII] {
        current = convert(&*current, next, &ctx(), &data).unwrap();
    }
    assert_eq!(chained.generation(), Generation::VIII);
    assert_eq!(chained.data(), current.data());
    assert_eq!(chained.species(), Species::BULBASAUR);
    assert_eq!(chained.nickname(), "Bulbasaur");
    assert!(chained.is_checksum_valid());
}

#[test]
fn test_chain_back_down_to_iv() {
    let data = game_data();
    let mut pk7 = empty(Generation::VII, RecordMode::Box);
    pk7.set_species(Species(25));
    pk7.set_pid(0x5555_0003);
    pk7.set_nature(Nature::MODEST);
    pk7.set_gender(Gender::Female);
    pk7.set_moves([Move(84), Move::NONE, Move::NONE, Move::NONE]);
    pk7.refresh_checksum();

    let pk4 = convert_chain(&*pk7, Generation::IV, &ctx(), &data).unwrap();
    assert_eq!(pk4.generation(), Generation::IV);
    assert_eq!(pk4.nature(), Nature::MODEST);
    assert_eq!(pk4.gender(), Some(Gender::Female));
    assert_eq!(Gender::from_pid(pk4.pid(), 127), Gender::Female);
    assert_eq!(pk4.is_shiny(), pk7.is_shiny());
    assert_eq!(pk4.pp(0), 30);
    assert!(pk4.is_checksum_valid());
}

#[test]
fn test_shininess_at_extremes() {
    for (pid, tid, sid) in [(0u32, 0u16, 0u16), (0xFFFF_FFFF, 0xFFFF, 0xFFFF), (0x0000_FFFF, 0, 0)] {
        let mut pk3 = empty(Generation::III, RecordMode::Box);
        pk3.set_pid(pid);
        pk3.set_tid(tid);
        pk3.set_sid(sid);
        pk3.set_species(Species(25));
        pk3.refresh_checksum();
        let shiny = pk3.is_shiny();

        let mut current = pk3.clone_owned();
        while let Some(next) = current.generation().successor() {
            current = convert(&*current, next, &ctx(), &NoData).unwrap();
            assert_eq!(current.is_shiny(), shiny, "pid {pid:#x} in {:?}", current.generation());
        }
    }
}

#[test]
fn test_borrowed_record_writes_through() {
    let mut pk6 = empty(Generation::VI, RecordMode::Party);
    pk6.set_species(Species(25));
    pk6.set_encryption_constant(0x1357_9BDF);
    pk6.refresh_checksum();
    let mut raw = pk6.encrypted_bytes();

    {
        let mut rec = from_slice(Generation::VI, &mut raw, RecordMode::Party).unwrap();
        assert!(rec.is_borrowed());
        assert!(!rec.is_encrypted());
        rec.set_species(Species(150));
        rec.refresh_checksum();
        rec.encrypt();
    }

    let back = from_bytes(Generation::VI, &raw, RecordMode::Party).unwrap();
    assert_eq!(back.species(), Species(150));
    assert!(back.is_checksum_valid());
}

#[test]
fn test_detect_and_length_errors() {
    let rec = detect(Generation::VIII, vec![0; 344]).unwrap();
    assert_eq!(rec.mode(), RecordMode::Party);
    let rec = detect(Generation::V, vec![0; 136]).unwrap();
    assert_eq!(rec.mode(), RecordMode::Box);

    assert!(matches!(detect(Generation::VI, vec![0; 100]), Err(RecordError::UnknownLength(100, Generation::VI))));
    assert!(matches!(
        from_bytes(Generation::III, &[0; 81], RecordMode::Box),
        Err(RecordError::InvalidLength { expected: 80, actual: 81, .. })
    ));
}

#[test]
fn test_game_data_lookup() {
    let data = game_data();
    let info = data.personal(Generation::VII, Species(25), 1).unwrap();
    assert_eq!(info.gender_ratio, 127);
    assert_eq!(data.species_name(Species(1), Language::ENG).as_deref(), Some("Bulbasaur"));
    assert_eq!(data.species_name(Species(1), Language::JPN), None);
    assert_eq!(data.move_base_pp(Move(33)), Some(35));

    let again = StaticGameData::from_json(&data.to_json().unwrap()).unwrap();
    assert_eq!(again.personal.len(), 2);
}
