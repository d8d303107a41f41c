//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use mailstyle::parsers::html::{create_element, find_first, get_node_attr, set_node_attr};
    use mailstyle::Document;

    #[test]
    fn before_callback_can_change_what_gets_styled() {
        let html = Document::fragment("<p>x</p>")
            .with_css(".greeting { color: green }")
            .with_before_transformation(|dom, _| {
                let p = find_first(dom, "p").unwrap();
                set_node_attr(&p, "class", Some("greeting".to_string()));
            })
            .transform()
            .unwrap();

        assert!(html.contains("style=\"color:green\""));
    }

    #[test]
    fn before_callback_sees_the_untouched_tree() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let recorder = Rc::clone(&seen);

        Document::fragment("<style>p { color: red }</style><p>x</p>")
            .with_before_transformation(move |dom, document| {
                let p = find_first(dom, "p").unwrap();
                recorder.borrow_mut().push(get_node_attr(&p, "style"));
                recorder
                    .borrow_mut()
                    .push(Some(find_first(dom, "style").is_some().to_string()));
                recorder.borrow_mut().push(Some(document.html().to_string()));
            })
            .transform()
            .unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                None,
                Some("true".to_string()),
                Some("<style>p { color: red }</style><p>x</p>".to_string())
            ]
        );
    }

    #[test]
    fn after_callback_sees_inlined_styles() {
        let seen = Rc::new(RefCell::new(None));
        let recorder = Rc::clone(&seen);

        Document::fragment("<p>x</p>")
            .with_css("p { margin: 0 }")
            .with_after_transformation(move |dom, _| {
                let p = find_first(dom, "p").unwrap();
                *recorder.borrow_mut() = get_node_attr(&p, "style");
            })
            .transform()
            .unwrap();

        assert_eq!(seen.borrow().as_deref(), Some("margin:0"));
    }

    #[test]
    fn after_callback_changes_are_serialized() {
        let html = Document::fragment("<p>x</p>")
            .with_after_transformation(|dom, _| {
                let p = find_first(dom, "p").unwrap();
                p.append(create_element("br", &[]));
            })
            .transform()
            .unwrap();

        assert_eq!(html, "<p>x<br></p>");
    }

    #[test]
    fn ignore_markers_are_removed_after_the_callback() {
        let marked = Rc::new(RefCell::new(false));
        let recorder = Rc::clone(&marked);

        let html = Document::fragment("<style data-mailstyle-ignore>p{}</style>")
            .with_after_transformation(move |dom, _| {
                let style = find_first(dom, "style").unwrap();
                *recorder.borrow_mut() =
                    get_node_attr(&style, "data-mailstyle-ignore").is_some();
            })
            .transform()
            .unwrap();

        assert!(*marked.borrow());
        assert_eq!(html, "<style>p{}</style>");
    }
}
