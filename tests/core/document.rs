//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::fs;

    use mailstyle::parsers::html::{find_first, get_node_attr, html_to_dom};
    use mailstyle::providers::FilesystemProvider;
    use mailstyle::{Document, DocumentMode, ProviderList, UrlOptions};

    fn newsletter() -> Document {
        let html = fs::read_to_string("tests/_data_/newsletter/index.html").unwrap();
        Document::new(html).with_asset_providers(ProviderList::of(FilesystemProvider::new(
            "tests/_data_/newsletter",
        )))
    }

    fn attr(html: &str, selector: &str, name: &str) -> Option<String> {
        let dom = html_to_dom(html);
        find_first(&dom, selector).and_then(|node| get_node_attr(&node, name))
    }

    #[test]
    fn inlines_linked_and_embedded_css() {
        let html = newsletter().transform().unwrap();

        assert_eq!(attr(&html, "p", "style").as_deref(), Some("color:green"));
        assert_eq!(attr(&html, "body", "style").as_deref(), Some("margin:0"));
        assert_eq!(
            attr(&html, "a.button", "style").as_deref(),
            Some("background:url(images/button.png);color:white !important;color: black")
        );
    }

    #[test]
    fn removes_inlined_stylesheet_elements() {
        let html = newsletter().transform().unwrap();
        let dom = html_to_dom(&html);

        assert!(find_first(&dom, "link[href='styles/main.css']").is_none());
        assert!(find_first(&dom, "link[href='styles/print.css']").is_some());
        assert!(find_first(&dom, "head style:not([type])").is_none());
    }

    #[test]
    fn keeps_uninlinable_css_in_head() {
        let html = newsletter().transform().unwrap();
        let dom = html_to_dom(&html);

        let style = find_first(&dom, "head style").unwrap();
        assert_eq!(get_node_attr(&style, "type").as_deref(), Some("text/css"));
        assert_eq!(style.text_contents(), "a:hover{color:red}");
    }

    #[test]
    fn rewrites_urls_when_url_options_are_given() {
        let html = newsletter()
            .with_url_options(UrlOptions::new("example.com").with_scheme("https"))
            .transform()
            .unwrap();

        assert_eq!(
            attr(&html, "a.button", "href").as_deref(),
            Some("https://example.com/offer")
        );
        assert_eq!(
            attr(&html, "img", "src").as_deref(),
            Some("https://example.com/images/logo.png")
        );
        assert_eq!(
            attr(&html, "a.button", "style").as_deref(),
            Some("background:url(https://example.com/images/button.png);color:white !important;color: black")
        );
    }

    #[test]
    fn improves_markup() {
        let html = Document::new("<p>Hello</p>")
            .with_css("p { color: green; }")
            .transform()
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<p style=\"color:green\">Hello</p>"));
        assert_eq!(
            attr(&html, "head meta[http-equiv]", "content").as_deref(),
            Some("text/html; charset=UTF-8")
        );
    }

    #[test]
    fn transforming_twice_adds_no_duplicate_markup() {
        let once = Document::new("<p>Hello</p>").transform().unwrap();
        let twice = Document::new(once.as_str()).transform().unwrap();

        assert_eq!(twice.matches("<!DOCTYPE").count(), 1);
        assert_eq!(twice.matches("http-equiv").count(), 1);
        assert_eq!(twice.matches("<head>").count(), 1);
    }

    #[test]
    fn specificity_decides_between_rules() {
        let html = Document::fragment("<p class=\"safe\">x</p>")
            .with_css("p { color: red } .safe { color: green }")
            .transform()
            .unwrap();
        assert_eq!(attr(&html, "p", "style").as_deref(), Some("color:green"));
    }

    #[test]
    fn important_overrides_specificity() {
        let html = Document::fragment("<a class=\"x\">x</a>")
            .with_css("a { text-decoration: underline !important } a.x { text-decoration: none }")
            .transform()
            .unwrap();
        assert_eq!(
            attr(&html, "a", "style").as_deref(),
            Some("text-decoration:underline !important")
        );
    }

    #[test]
    fn added_css_wins_ties_with_document_css() {
        let html = Document::fragment("<style>p { color: red }</style><p>x</p>")
            .with_css("p { color: blue }")
            .transform()
            .unwrap();
        assert_eq!(html, "<p style=\"color:blue\">x</p>");
    }

    #[test]
    fn equal_specificity_rules_apply_in_order() {
        let html = Document::fragment("<p>x</p>")
            .with_css("p { color: red } p { margin: 0 }")
            .transform()
            .unwrap();
        assert_eq!(html, "<p style=\"color:red;margin:0\">x</p>");
    }

    #[test]
    fn existing_style_attribute_is_kept() {
        let html = Document::fragment("<p style=\"color: blue\">x</p>")
            .with_css("p { margin: 0 }")
            .transform()
            .unwrap();
        assert_eq!(html, "<p style=\"margin:0;color: blue\">x</p>");
    }

    #[test]
    fn unsupported_selectors_do_not_stop_other_rules() {
        let html = Document::fragment("<p>x</p>")
            .with_css("p:unknown-thing { color: red } p { margin: 0 }")
            .with_keep_uninlinable_css(false)
            .transform()
            .unwrap();
        assert_eq!(html, "<p style=\"margin:0\">x</p>");
    }

    #[test]
    fn external_stylesheets_are_left_alone_by_default() {
        let html = Document::new(
            "<link rel=\"stylesheet\" href=\"https://cdn.example.com/x.css\"><p>x</p>",
        )
        .transform()
        .unwrap();
        assert_eq!(
            attr(&html, "link", "href").as_deref(),
            Some("https://cdn.example.com/x.css")
        );
    }

    #[test]
    fn ignored_elements_stay_but_lose_their_marker() {
        let html = Document::fragment("<style data-mailstyle-ignore>p { color: red }</style><p>x</p>")
            .transform()
            .unwrap();
        assert_eq!(html, "<style>p { color: red }</style><p>x</p>");
    }

    #[test]
    fn template_placeholders_survive() {
        let html = Document::fragment("<a href=\"{{ url }}\">{{ a && b }}</a>")
            .with_url_options(UrlOptions::new("example.com"))
            .transform()
            .unwrap();
        assert_eq!(html, "<a href=\"{{ url }}\">{{ a && b }}</a>");
    }

    #[test]
    fn xhtml_mode_closes_void_elements() {
        let html = Document::fragment("<p>a<br>b</p>")
            .with_mode(DocumentMode::Xhtml)
            .transform()
            .unwrap();
        assert_eq!(html, "<p>a<br />b</p>");
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
    use mailstyle::providers::FilesystemProvider;
    use mailstyle::{Document, MailstyleError, ProviderList, UrlOptions};

    #[test]
    fn missing_linked_stylesheet() {
        let result = Document::new("<link rel=\"stylesheet\" href=\"missing.css\"><p>x</p>")
            .with_asset_providers(ProviderList::of(FilesystemProvider::new(
                "tests/_data_/newsletter",
            )))
            .transform();

        match result {
            Err(MailstyleError::CssNotFound(error)) => {
                assert_eq!(error.css_name, "missing.css");
                assert!(error.to_string().contains("FilesystemProvider"));
            }
            other => panic!("expected CssNotFound, got {:?}", other),
        }
    }

    #[test]
    fn malformed_added_css() {
        let result = Document::fragment("<p>x</p>")
            .with_css("p { color red }")
            .transform();

        match result {
            Err(MailstyleError::MalformedDeclaration { stylesheet, .. }) => {
                assert_eq!(stylesheet, "(added css)");
            }
            other => panic!("expected MalformedDeclaration, got {:?}", other),
        }
    }

    #[test]
    fn url_options_without_host() {
        let result = Document::fragment("<a href=\"/x\">x</a>")
            .with_url_options(UrlOptions::default())
            .transform();

        match result {
            Err(MailstyleError::InvalidUrlOptions(message)) => {
                assert!(message.starts_with("No host was specified"));
            }
            other => panic!("expected InvalidUrlOptions, got {:?}", other),
        }
    }

    #[test]
    fn unparseable_link() {
        let result = Document::fragment("<a href=\":foo\">x</a>")
            .with_url_options(UrlOptions::new("example.com"))
            .transform();

        assert!(matches!(result, Err(MailstyleError::InvalidUrlPath { .. })));
    }
}
