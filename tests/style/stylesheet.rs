//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use mailstyle::parsers::css::calculate_specificity;
    use mailstyle::style::{deduplicate, Selector, Specificity, StyleProperty, Stylesheet};

    #[test]
    fn specificity_of_common_selectors() {
        let cases = [
            ("*", (0, 0, 0)),
            ("p", (0, 0, 1)),
            ("ul li", (0, 0, 2)),
            ("a[href]", (0, 1, 1)),
            (".a.b", (0, 2, 0)),
            ("#nav .item > a", (1, 1, 1)),
            ("a:hover", (0, 1, 1)),
            ("li::before", (0, 0, 2)),
            ("p:first-line", (0, 0, 2)),
            ("ul li:not(.x)", (0, 1, 2)),
            ("div:where(#a)", (0, 0, 1)),
        ];

        for (selector, (a, b, c)) in cases {
            assert_eq!(
                calculate_specificity(selector),
                Specificity::new(a, b, c),
                "specificity of {}",
                selector
            );
        }
    }

    #[test]
    fn specificity_orders_by_ids_then_classes_then_types() {
        assert!(Specificity::new(1, 0, 0) > Specificity::new(0, 12, 12));
        assert!(Specificity::new(0, 1, 0) > Specificity::new(0, 0, 99));
        assert_eq!(Specificity::new(1, 2, 3).to_string(), "1,2,3");
    }

    #[test]
    fn selectors_that_cannot_be_inlined() {
        for selector in ["a:hover", "a:visited", "input:focus", "p::first-line", "@font-face"] {
            assert!(!Selector::new(selector).is_inlinable(), "{}", selector);
        }
        for selector in ["p", "a.link", "li:first-child", "li:nth-child(2)", "a[href]"] {
            assert!(Selector::new(selector).is_inlinable(), "{}", selector);
        }
    }

    #[test]
    fn declarations() {
        let property = StyleProperty::parse("  color : red  ! IMPORTANT ", Specificity::new(0, 0, 1))
            .unwrap();
        assert_eq!(property.property, "color");
        assert_eq!(property.value, "red");
        assert!(property.important);
        assert_eq!(property.to_string(), "color:red !important");

        let property = StyleProperty::parse(
            "background: url(data:image/png;base64,AAA=)",
            Specificity::default(),
        )
        .unwrap();
        assert_eq!(property.value, "url(data:image/png;base64,AAA=)");
    }

    #[test]
    fn stylesheet_blocks_keep_source_order() {
        let stylesheet = Stylesheet::new(
            "order.css",
            "h1 { color: red }\n/* comment */\np, a { margin: 0; padding: 0 }",
        )
        .unwrap();

        let selectors: Vec<_> = stylesheet
            .blocks()
            .iter()
            .map(|block| block.selector_string())
            .collect();
        assert_eq!(selectors, vec!["h1", "p", "a"]);
        assert_eq!(stylesheet.to_css(), "h1{color:red}\np{margin:0;padding:0}\na{margin:0;padding:0}");
    }

    #[test]
    fn empty_stylesheet() {
        assert!(Stylesheet::new("empty.css", "  /* nothing */ ").unwrap().is_empty());
    }

    #[test]
    fn deduplicate_keeps_last_occurrence() {
        assert_eq!(
            deduplicate(vec!["a", "b", "a", "c", "b"]),
            vec!["a", "c", "b"]
        );
        assert_eq!(deduplicate(vec![1, 2, 3]), vec![1, 2, 3]);
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
    use mailstyle::style::{Specificity, StyleProperty, Stylesheet};
    use mailstyle::MailstyleError;

    #[test]
    fn declaration_without_colon() {
        assert!(StyleProperty::parse("color red", Specificity::default()).is_none());
    }

    #[test]
    fn declaration_without_value() {
        assert!(StyleProperty::parse("color:", Specificity::default()).is_none());
        assert!(StyleProperty::parse("color:   ", Specificity::default()).is_none());
    }

    #[test]
    fn stylesheet_with_malformed_declaration() {
        let error = Stylesheet::new("app.css", "p { margin: 0; color red; }").unwrap_err();
        assert!(matches!(
            error,
            MailstyleError::MalformedDeclaration { ref declaration, ref stylesheet }
                if declaration == "color red" && stylesheet == "app.css"
        ));
    }
}
