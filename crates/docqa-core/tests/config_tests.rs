use docqa_core::config::{Config, EmbeddingProvider, Settings};
use figment::Jail;

#[test]
fn defaults_match_pipeline_constants() {
    let settings = Settings::default();
    assert_eq!(settings.chunking.chunk_size, 1000);
    assert_eq!(settings.chunking.chunk_overlap, 200);
    assert_eq!(settings.retrieval.top_k, 5);
    assert_eq!(settings.retrieval.fallback_context_chunks, 3);
    assert_eq!(settings.llm.api_key_env, "GOOGLE_API_KEY");
    assert_eq!(settings.embedding.provider, EmbeddingProvider::Local);
    assert!(settings.validate().is_ok());
}

#[test]
fn files_and_env_are_layered() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [llm]
            model = "gemini-1.5-pro"
            temperature = 0.2

            [retrieval]
            top_k = 8
            "#,
        )?;
        jail.create_file(
            "config.test.toml",
            r#"
            [embedding]
            provider = "fake"
            "#,
        )?;
        jail.set_env("APP_RETRIEVAL__TOP_K", "3");

        let config = Config::load_for_env("test").expect("config");
        let s = config.settings();
        assert_eq!(s.llm.model, "gemini-1.5-pro");
        assert!((s.llm.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(s.embedding.provider, EmbeddingProvider::Fake);
        assert_eq!(s.retrieval.top_k, 3, "env overrides files");
        assert_eq!(s.chunking.chunk_size, 1000, "untouched keys keep defaults");
        assert_eq!(config.get::<String>("llm.model").expect("key"), "gemini-1.5-pro");
        Ok(())
    });
}

#[test]
fn invalid_chunking_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [chunking]
            chunk_size = 100
            chunk_overlap = 300
            "#,
        )?;
        assert!(Config::load_for_env("dev").is_err());
        Ok(())
    });
}
