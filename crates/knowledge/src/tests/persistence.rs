use crate::index::IndexStore;
use crate::vector_index::FlatL2Index;
use proptest::prelude::*;
use tempfile::TempDir;

fn corpus() -> impl Strategy<Value = (Vec<Vec<f32>>, Vec<String>)> {
    (1usize..6).prop_flat_map(|dim| {
        prop::collection::vec(prop::collection::vec(-10.0f32..10.0, dim), 1..24).prop_flat_map(
            |vectors| {
                let n = vectors.len();
                (Just(vectors), prop::collection::vec(".{0,40}", n))
            },
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_saved_pair_reloads_identically((vectors, chunks) in corpus(), k in 1usize..30) {
        let temp = TempDir::new().unwrap();
        let store = IndexStore::new(temp.path().join("index"));
        let query = vectors[0].clone();
        let index = FlatL2Index::build(vectors).unwrap();

        store.save(&index, &chunks).unwrap();
        let loaded = store.load().unwrap();

        prop_assert_eq!(&loaded.index, &index);
        prop_assert_eq!(&loaded.chunks, &chunks);
        prop_assert_eq!(
            loaded.index.search(&query, k).unwrap(),
            index.search(&query, k).unwrap()
        );
    }
}
