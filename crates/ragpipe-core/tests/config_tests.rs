use figment::Jail;

use ragpipe_core::chunking::ChunkStrategy;
use ragpipe_core::config::{resolve_with_base, Config, Settings};
use ragpipe_core::Error;

#[test]
fn defaults_apply_without_files() {
    Jail::expect_with(|_jail| {
        let config = Config::load_for_env("dev").expect("load");
        assert_eq!(config.settings(), &Settings::default());
        assert_eq!(config.settings().retrieval.rrf_k, 60.0);
        Ok(())
    });
}

#[test]
fn files_and_env_layer_in_order() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [chunking]
            strategy = "sentence"
            chunk_size = 500
            chunk_overlap = 50

            [retrieval]
            hybrid_enabled = true
            mmr_lambda = 0.5
            "#,
        )?;
        jail.create_file("config.prod.toml", "[retrieval]\ncandidate_multiplier = 5\n")?;
        jail.set_env("APP_RETRIEVAL__RERANK_ENABLED", "true");
        jail.set_env("APP_CHUNKING__CHUNK_SIZE", "800");

        let config = Config::load_for_env("prod").expect("load");
        let settings = config.settings();
        assert_eq!(settings.chunking.strategy, ChunkStrategy::Sentence);
        assert_eq!(settings.chunking.chunk_size, 800);
        assert_eq!(settings.chunking.chunk_overlap, 50);
        assert!(settings.retrieval.hybrid_enabled);
        assert!(settings.retrieval.rerank_enabled);
        assert_eq!(settings.retrieval.candidate_multiplier, 5);
        assert_eq!(config.get::<f32>("retrieval.mmr_lambda").expect("lambda"), 0.5);
        Ok(())
    });
}

#[test]
fn unknown_strategy_is_rejected_with_choices() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nstrategy = \"semantic\"\n")?;
        let err = Config::load_for_env("dev").err().expect("must fail");
        let msg = err.to_string();
        assert!(msg.contains("fixed, sentence, paragraph"), "{msg}");
        Ok(())
    });
}

#[test]
fn lambda_out_of_range_is_invalid() {
    Jail::expect_with(|jail| {
        jail.set_env("APP_RETRIEVAL__MMR_LAMBDA", "1.5");
        assert!(matches!(Config::load_for_env("dev"), Err(Error::InvalidConfig(_))));
        Ok(())
    });
}

#[test]
fn overlap_not_smaller_than_size_is_invalid() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n")?;
        assert!(matches!(Config::load_for_env("test"), Err(Error::InvalidConfig(_))));
        Ok(())
    });
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = std::path::Path::new("/srv/ragpipe");
    assert_eq!(resolve_with_base(base, "data/txt"), base.join("data/txt"));
    assert_eq!(resolve_with_base(base, "/abs/idx"), std::path::PathBuf::from("/abs/idx"));
}
