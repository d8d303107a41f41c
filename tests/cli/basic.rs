//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::fs;

    use assert_cmd::Command;

    #[test]
    fn print_version() {
        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .arg("-V")
            .output()
            .unwrap();

        assert_eq!(String::from_utf8_lossy(&out.stderr), "");
        assert_eq!(
            String::from_utf8_lossy(&out.stdout),
            format!("{} {}\n", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        );
        assert_eq!(out.status.code(), Some(0));
    }

    #[test]
    fn fragment_from_stdin() {
        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .args(["--fragment", "--css", "tests/_data_/newsletter/styles/main.css"])
            .write_stdin("<a class=\"button\">Shop</a>")
            .output()
            .unwrap();
        assert!(out.status.success());

        let html = String::from_utf8_lossy(&out.stdout);
        assert!(html.starts_with("<style type=\"text/css\">a:hover{color:red}</style><a "));
        assert!(html.contains("style=\"background:url(images/button.png);color:white !important\""));
        assert!(html.ends_with("</a>\n"));
    }

    #[test]
    fn document_with_url_options() {
        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .args([
                "tests/_data_/newsletter/index.html",
                "--asset-root",
                "tests/_data_/newsletter",
                "--url-option",
                "host=example.com",
                "-u",
                "scheme=https",
            ])
            .output()
            .unwrap();
        assert!(out.status.success());

        let html = String::from_utf8_lossy(&out.stdout);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("href=\"https://example.com/offer\""));
        assert!(html.contains("url(https://example.com/images/button.png)"));
        assert!(!html.contains("styles/main.css"));
    }

    #[test]
    fn output_file_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("mailstyle.toml");
        let output = dir.path().join("out.html");
        fs::write(
            &config,
            "fragment = true\nmode = \"xhtml\"\n\n[url_options]\nhost = \"example.com\"\n",
        )
        .unwrap();

        Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .arg("--config")
            .arg(&config)
            .arg("--output")
            .arg(&output)
            .write_stdin("<img src=\"logo.png\">")
            .assert()
            .success()
            .stdout("");

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "<img src=\"http://example.com/logo.png\" />"
        );
    }

    #[test]
    fn env_help() {
        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .arg("--env-help")
            .output()
            .unwrap();

        assert!(out.status.success());
        assert!(String::from_utf8_lossy(&out.stdout).contains("MAILSTYLE_LOG_LEVEL"));
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
    use assert_cmd::Command;

    #[test]
    fn missing_linked_stylesheet() {
        let out = Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .env("NO_COLOR", "1")
            .write_stdin("<link rel=\"stylesheet\" href=\"nope.css\"><p>x</p>")
            .output()
            .unwrap();

        assert_eq!(out.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&out.stderr)
            .starts_with("Could not find stylesheet \"nope.css\""));
        assert_eq!(String::from_utf8_lossy(&out.stdout), "");
    }

    #[test]
    fn invalid_url_option() {
        Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .args(["--fragment", "-u", "colour=red"])
            .write_stdin("<p>x</p>")
            .assert()
            .code(1);
    }

    #[test]
    fn invalid_log_level() {
        Command::cargo_bin(env!("CARGO_PKG_NAME"))
            .unwrap()
            .env("MAILSTYLE_LOG_LEVEL", "loud")
            .write_stdin("<p>x</p>")
            .assert()
            .code(1);
    }
}
