//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::fmt;
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use mailstyle::providers::{CachedProvider, LruStore};
    use mailstyle::{AssetProvider, MailstyleError, MailstyleResult, Stylesheet};

    /// 只认识 `known.css` 的提供者，记录被调用的次数
    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl AssetProvider for Counting {
        fn find_stylesheet(&self, name: &str) -> MailstyleResult<Option<Stylesheet>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if name == "known.css" {
                Stylesheet::new(name, "p { color: red }").map(Some)
            } else {
                Ok(None)
            }
        }
    }

    impl fmt::Display for Counting {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Counting")
        }
    }

    fn counting() -> (Counting, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Counting {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[test]
    fn found_stylesheets_are_fetched_once() {
        let (upstream, calls) = counting();
        let provider = CachedProvider::new(upstream);

        for _ in 0..3 {
            assert!(provider.find_stylesheet("known.css").unwrap().is_some());
        }
        assert!(provider.find_stylesheet_strict("known.css").is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_stylesheets_are_fetched_once() {
        let (upstream, calls) = counting();
        let provider = CachedProvider::new(upstream);

        assert!(provider.find_stylesheet("missing.css").unwrap().is_none());
        assert!(provider.find_stylesheet("missing.css").unwrap().is_none());
        match provider.find_stylesheet_strict("missing.css") {
            Err(MailstyleError::CssNotFound(error)) => assert_eq!(
                error.reason,
                "Stylesheet was previously reported missing by the upstream provider"
            ),
            other => panic!("expected CssNotFound, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn lru_store_evicts_old_entries() {
        let (upstream, calls) = counting();
        let provider = CachedProvider::with_store(
            Arc::new(upstream),
            LruStore::new(NonZeroUsize::new(1).unwrap()),
        );

        provider.find_stylesheet("known.css").unwrap();
        provider.find_stylesheet("other.css").unwrap();
        provider.find_stylesheet("known.css").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(provider.store().len(), 1);
    }

    #[test]
    fn description_includes_upstream() {
        let (upstream, _) = counting();
        assert_eq!(CachedProvider::new(upstream).to_string(), "CachedProvider:\n\tCounting");
    }
}
