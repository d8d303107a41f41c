//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use mailstyle::providers::{ManifestPipeline, PipelineProvider};
    use mailstyle::AssetProvider;

    fn provider() -> PipelineProvider<ManifestPipeline> {
        PipelineProvider::new(ManifestPipeline::load("tests/_data_/pipeline", "manifest.json").unwrap())
    }

    #[test]
    fn logical_names() {
        let provider = provider();

        assert_eq!(provider.logical_name("/assets/app.css"), "app.css");
        assert_eq!(provider.logical_name("/assets/app-0123abcd.css?body=1"), "app.css");
        assert_eq!(provider.logical_name("app"), "app.css");
        assert_eq!(provider.logical_name("mail/layout-v2.css"), "mail/layout-v2.css");
    }

    #[test]
    fn finds_fingerprinted_stylesheet() {
        let provider = provider();

        for name in ["app.css", "/assets/app.css", "/assets/app-0123abcd.css"] {
            let stylesheet = provider.find_stylesheet(name).unwrap().unwrap();
            assert_eq!(stylesheet.name, "app.css");
            assert_eq!(stylesheet.to_css(), "h1{font-size:24px}");
        }
    }

    #[test]
    fn custom_prefix() {
        let provider = provider().with_prefix("/static/");

        assert!(provider.find_stylesheet("/static/app.css").unwrap().is_some());
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use mailstyle::providers::{ManifestPipeline, PipelineProvider};
    use mailstyle::{AssetProvider, MailstyleError};

    #[test]
    fn not_part_of_pipeline() {
        let provider = PipelineProvider::new(
            ManifestPipeline::load("tests/_data_/pipeline", "manifest.json").unwrap(),
        );

        match provider.find_stylesheet_strict("/assets/missing.css") {
            Err(MailstyleError::CssNotFound(error)) => {
                assert_eq!(error.reason, "missing.css is not part of the asset pipeline");
            }
            other => panic!("expected CssNotFound, got {:?}", other),
        }
    }

    #[test]
    fn manifest_entry_without_file() {
        let provider = PipelineProvider::new(
            ManifestPipeline::load("tests/_data_/pipeline", "manifest.json").unwrap(),
        );

        assert!(provider.find_stylesheet("stale.css").unwrap().is_none());
    }

    #[test]
    fn missing_manifest() {
        assert!(matches!(
            ManifestPipeline::load("tests/_data_/pipeline", "nope.json"),
            Err(MailstyleError::Io(_))
        ));
    }
}
