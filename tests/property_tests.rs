use chrono::NaiveDate;
use proptest::prelude::*;
use recordbook::slot::{self, SlotContent};
use recordbook::{
    FileRecordStore, MemoryRecordStore, Options, Record, RecordParams, RecordStore, Validator,
};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
enum Operation {
    Create(RecordParams),
    Update { id: i32, params: RecordParams },
    Remove { id: i32 },
    Insert { id: i32, params: RecordParams },
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1900i32..=2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000_000i64..1_000_000_000_000, 0u32..=28)
        .prop_map(|(num, scale)| Decimal::new(num, scale))
}

fn arb_params() -> impl Strategy<Value = RecordParams> {
    (
        "[A-Za-z0-9]{0,60}",
        "[A-Za-z0-9]{0,60}",
        arb_date(),
        any::<i16>(),
        arb_decimal(),
        any::<u8>().prop_map(char::from),
    )
        .prop_map(|(first_name, last_name, date_of_birth, prop_short, prop_decimal, prop_char)| {
            RecordParams { first_name, last_name, date_of_birth, prop_short, prop_decimal, prop_char }
        })
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        arb_params().prop_map(Operation::Create),
        (1i32..=20, arb_params()).prop_map(|(id, params)| Operation::Update { id, params }),
        (1i32..=20).prop_map(|id| Operation::Remove { id }),
        (1i32..=20, arb_params()).prop_map(|(id, params)| Operation::Insert { id, params }),
    ]
}

fn open_file_store(dir: &tempfile::TempDir) -> FileRecordStore {
    let options = Options::default().sync_writes(false).keep_backup(false);
    FileRecordStore::open(dir.path().join("records.bin"), options)
        .unwrap()
        .with_validator(Validator::new())
}

fn sorted(mut records: Vec<Record>) -> Vec<Record> {
    records.sort_by_key(|r| r.id);
    records
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_slot_round_trip(id in any::<i32>(), params in arb_params()) {
        let record = Record::new(id, params);
        let bytes = slot::encode(&record).unwrap();

        prop_assert_eq!(bytes.len(), slot::SLOT_SIZE);
        prop_assert_eq!(slot::decode(&bytes).unwrap(), SlotContent::Live(record));
    }

    #[test]
    fn prop_tombstone_hides_payload(id in any::<i32>(), params in arb_params()) {
        let mut bytes = slot::encode(&Record::new(id, params)).unwrap();
        bytes[..2].copy_from_slice(&slot::TOMBSTONE_FLAG.to_le_bytes());

        prop_assert_eq!(slot::decode(&bytes).unwrap(), SlotContent::Tombstoned);
    }

    #[test]
    fn prop_ordered_inserts_stay_sorted(
        ids in prop::collection::btree_set(1i32..10_000, 1..20)
            .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
        params in arb_params(),
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let mut store = open_file_store(&dir);

        for id in &ids {
            store.insert(*id, params.clone()).unwrap();
        }

        let stored: Vec<i32> = store.records().unwrap().iter().map(|r| r.id).collect();
        let mut expected = ids.clone();
        expected.sort_unstable();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_file_store_matches_memory_store(
        ops in prop::collection::vec(arb_operation(), 1..40),
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let mut file = open_file_store(&dir);
        let mut memory = MemoryRecordStore::new(Validator::new());

        for op in ops {
            let (file_result, memory_result) = match op {
                Operation::Create(params) => (
                    file.create(params.clone()).map(|_| ()),
                    memory.create(params).map(|_| ()),
                ),
                Operation::Update { id, params } => {
                    (file.update(id, params.clone()), memory.update(id, params))
                }
                Operation::Remove { id } => (file.remove(id), memory.remove(id)),
                Operation::Insert { id, params } => {
                    (file.insert(id, params.clone()), memory.insert(id, params))
                }
            };
            prop_assert_eq!(file_result.is_ok(), memory_result.is_ok());

            let stat = file.stat().unwrap();
            prop_assert_eq!(stat.live + stat.deleted(), stat.total);
            prop_assert_eq!(stat.live, memory.stat().unwrap().live);
        }

        prop_assert_eq!(sorted(file.records().unwrap()), memory.records().unwrap());

        let stats = file.defragment().unwrap();
        let stat = file.stat().unwrap();
        prop_assert_eq!(stat.total, stat.live);
        prop_assert_eq!(stats.surviving, stat.live);
        prop_assert_eq!(sorted(file.records().unwrap()), memory.records().unwrap());
    }
}
