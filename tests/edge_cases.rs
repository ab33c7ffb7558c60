//! Boundary conditions and error locality across the crate.

use ricercar::benchmark::datasets::uniform_corpus;
use ricercar::{
    Backend, BackendKind, Corpus, ExactIndex, FeatureSequence, HnswIndex, HnswParams, IndexConfig,
    IndexError, KdTreeIndex, NearestNeighbors, ShingleCollection,
};

// =============================================================================
// Build failures
// =============================================================================

#[test]
fn empty_corpus_cannot_be_built() {
    assert_eq!(Corpus::from_items(&[]).unwrap_err(), IndexError::EmptyCorpus);

    let empty_shingles = ShingleCollection::new(24).expect("collection");
    assert_eq!(
        Corpus::from_shingles(&empty_shingles).unwrap_err(),
        IndexError::EmptyCorpus
    );
}

#[test]
fn invalid_hnsw_parameters_abort_the_build() {
    let corpus = uniform_corpus(10, 4, 1).expect("corpus");
    for bad in [
        HnswParams { m: 0, ..Default::default() },
        HnswParams { m: 1, ..Default::default() },
        HnswParams { ef_construction: 0, ..Default::default() },
        HnswParams { ef_search: 0, ..Default::default() },
        HnswParams { m: 16, m_max0: 8, ..Default::default() },
    ] {
        assert!(matches!(
            HnswIndex::build(&corpus, bad),
            Err(IndexError::InvalidParameter(_))
        ));
    }
}

#[test]
fn zero_leaf_size_aborts_the_kdtree_build() {
    let corpus = uniform_corpus(10, 4, 1).expect("corpus");
    assert!(matches!(
        KdTreeIndex::build(&corpus, 0),
        Err(IndexError::InvalidParameter(_))
    ));
}

#[test]
fn backend_build_rejects_invalid_config() {
    let corpus = uniform_corpus(10, 4, 1).expect("corpus");
    let broken = IndexConfig { ef: 0, ..Default::default() };
    for kind in BackendKind::ALL {
        assert!(matches!(
            Backend::build(kind, &corpus, &broken, 42),
            Err(IndexError::InvalidParameter(_))
        ));
    }
}

// =============================================================================
// Query failures stay local
// =============================================================================

#[test]
fn dimension_mismatch_leaves_the_index_usable() {
    let corpus = uniform_corpus(20, 4, 2).expect("corpus");
    let config = IndexConfig::default();
    for kind in BackendKind::ALL {
        let backend = Backend::build(kind, &corpus, &config, 42).expect("build");

        let err = backend.search(&[0.0; 7], 3).unwrap_err();
        assert_eq!(err, IndexError::DimensionMismatch { query: 7, item: 4 });

        // The failed call must not poison the index.
        let hits = backend.search(corpus.item(5), 3).expect("follow-up search");
        assert_eq!(hits[0].0, 5);
    }
}

#[test]
fn zero_k_is_rejected_before_any_scan() {
    let corpus = uniform_corpus(20, 4, 3).expect("corpus");
    let config = IndexConfig::default();
    for kind in BackendKind::ALL {
        let backend = Backend::build(kind, &corpus, &config, 42).expect("build");
        assert!(matches!(
            backend.search(corpus.item(0), 0),
            Err(IndexError::InvalidParameter(_))
        ));
    }
}

// =============================================================================
// Degenerate data
// =============================================================================

#[test]
fn all_identical_items_search_cleanly() {
    let corpus = Corpus::from_items(&vec![vec![1.0, 2.0, 3.0]; 40]).expect("corpus");
    let config = IndexConfig::default();
    for kind in [BackendKind::Exact, BackendKind::KdTree] {
        let backend = Backend::build(kind, &corpus, &config, 42).expect("build");
        let hits = backend.search(&[1.0, 2.0, 3.0], 6).expect("search");
        assert_eq!(
            hits.iter().map(|&(i, _)| i).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5],
            "{kind} tie-break"
        );
    }
    let hnsw = Backend::build(BackendKind::Hnsw, &corpus, &config, 42).expect("build");
    let hits = hnsw.search(&[1.0, 2.0, 3.0], 6).expect("search");
    assert_eq!(hits.len(), 6);
    assert!(hits.iter().all(|&(_, d)| d == 0.0));
}

#[test]
fn single_item_corpus_works_on_every_backend() {
    let corpus = Corpus::from_items(&[vec![0.5, 0.5]]).expect("corpus");
    let config = IndexConfig::default();
    for kind in BackendKind::ALL {
        let backend = Backend::build(kind, &corpus, &config, 42).expect("build");
        let hits = backend.search(&[9.0, 9.0], 4).expect("search");
        assert_eq!(hits.len(), 1, "{kind} clamps k to a single item");
        assert_eq!(hits[0].0, 0);
    }
}

// =============================================================================
// Shingling boundaries
// =============================================================================

#[test]
fn recording_shorter_than_the_window_contributes_nothing() {
    let frames: Vec<Vec<f32>> = (0..5).map(|t| vec![t as f32, 0.0]).collect();
    let seq = FeatureSequence::from_frames(2, &frames).expect("sequence");
    let mut shingles = ShingleCollection::new(2 * 20).expect("collection");
    let added = shingles.push_sequence(&seq, 20, 0).expect("push");
    assert_eq!(added, 0);
    assert!(shingles.is_empty());
}

#[test]
fn empty_sequence_is_valid_input() {
    let seq = FeatureSequence::from_frames(12, &[]).expect("sequence");
    assert_eq!(seq.num_frames(), 0);
    let mut shingles = ShingleCollection::new(12 * 20).expect("collection");
    assert_eq!(shingles.push_sequence(&seq, 20, 1).expect("push"), 0);
}

#[test]
fn window_of_one_emits_one_shingle_per_frame() {
    let frames: Vec<Vec<f32>> = (0..6).map(|t| vec![t as f32]).collect();
    let seq = FeatureSequence::from_frames(1, &frames).expect("sequence");
    let mut shingles = ShingleCollection::new(1).expect("collection");
    assert_eq!(shingles.push_sequence(&seq, 1, 2).expect("push"), 6);
    assert_eq!(shingles.shingle(4), &[4.0]);
}

#[test]
fn mismatched_shingle_dimension_is_rejected() {
    let frames: Vec<Vec<f32>> = (0..30).map(|t| vec![t as f32, 1.0]).collect();
    let seq = FeatureSequence::from_frames(2, &frames).expect("sequence");
    let mut shingles = ShingleCollection::new(2 * 20).expect("collection");
    // Window of 10 frames would make 20-dim shingles, not the declared 40.
    assert!(matches!(
        shingles.push_sequence(&seq, 10, 0),
        Err(IndexError::DimensionMismatch { .. })
    ));
}

// =============================================================================
// End-to-end: shingles straight into an index
// =============================================================================

#[test]
fn shingled_recordings_are_retrievable_with_provenance() {
    // Two synthetic recordings with distinct chroma ramps.
    let make = |offset: f32| -> FeatureSequence {
        let frames: Vec<Vec<f32>> = (0..30)
            .map(|t| (0..4).map(|d| offset + (t + d) as f32 * 0.1).collect())
            .collect();
        FeatureSequence::from_frames(4, &frames).expect("sequence")
    };
    let window = 5;
    let mut shingles = ShingleCollection::new(4 * window).expect("collection");
    shingles.push_sequence(&make(0.0), window, 100).expect("push");
    shingles.push_sequence(&make(50.0), window, 200).expect("push");

    let corpus = Corpus::from_shingles(&shingles).expect("corpus");
    let exact = ExactIndex::build(&corpus).expect("exact");

    // A query equal to a shingle of recording 200 must resolve back to it.
    let probe = shingles.len() - 3;
    let hits = exact.search(shingles.shingle(probe), 1).expect("search");
    assert_eq!(hits[0].0 as usize, probe);
    assert_eq!(shingles.source(hits[0].0 as usize), 200);
}
