// One-shot facade calls against the fake server

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::ClientConfig;
    use crate::core_error::FtpError;
    use crate::core_testing::FakeServer;
    use crate::core_transfer::TransferMode;
    use crate::session::ConnectionState;

    fn client(server: &FakeServer, password: &str) -> FtpClient {
        FtpClient::new(&server.host(), server.port(), "tester", password, true)
    }

    async fn quit_count(server: &FakeServer) -> usize {
        server.verbs().await.iter().filter(|v| *v == "QUIT").count()
    }

    #[tokio::test]
    async fn test_each_call_opens_and_closes() {
        let server = FakeServer::start().await;
        let client = client(&server, "secret");
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("report.csv");
        tokio::fs::write(&local, b"id,value\n1,42\n").await.unwrap();

        let sent = client
            .upload(&local, "/report.csv", TransferMode::Binary)
            .await
            .unwrap();
        assert_eq!(sent, 14);
        assert_eq!(client.file_size("/report.csv").await.unwrap(), Some(14));
        assert_eq!(client.file_size("/other.csv").await.unwrap(), None);
        assert_eq!(client.list_directory("/").await.unwrap(), vec!["report.csv"]);
        assert!(client.directory_exists("/").await.unwrap());

        let copy = dir.path().join("copy.csv");
        client
            .download("/report.csv", &copy, TransferMode::Binary)
            .await
            .unwrap();
        assert_eq!(tokio::fs::read(&copy).await.unwrap(), b"id,value\n1,42\n");

        assert_eq!(quit_count(&server).await, 6);
    }

    #[tokio::test]
    async fn test_failed_action_still_closes() {
        let server = FakeServer::start().await;
        let client = client(&server, "secret");

        let err = client.delete("/nothing-here").await.unwrap_err();
        assert!(err.to_string().starts_with("Unable to delete remote file"));
        assert_eq!(quit_count(&server).await, 1);

        client.make_directory("/dir").await.unwrap();
        client.rename("/dir", "/renamed").await.unwrap();
        client.set_permissions("/renamed", 0o750).await.unwrap();
        client.remove_directory("/renamed").await.unwrap();
        assert!(!server.has_dir("/renamed").await);
        assert_eq!(quit_count(&server).await, 5);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let server = FakeServer::start().await;
        let err = client(&server, "nope").file_size("/x").await.unwrap_err();
        assert!(matches!(err, FtpError::Auth(_)));
        assert!(err
            .to_string()
            .starts_with("Connected to server but unable to authenticate user"));
        assert_eq!(quit_count(&server).await, 1);
        assert!(!server.verbs().await.contains(&"SIZE".to_string()));
    }

    #[tokio::test]
    async fn test_open_returns_reusable_session() {
        let server = FakeServer::start().await;
        let mut session = client(&server, "secret").open().await.unwrap();
        assert_eq!(session.state(), ConnectionState::Authenticated);
        session
            .upload_bytes(b"a", "/a", TransferMode::Binary)
            .await
            .unwrap();
        session
            .upload_bytes(b"bb", "/b", TransferMode::Binary)
            .await
            .unwrap();
        let shared = session.into_shared();
        let names = shared.lock().await.list_directory("").await.unwrap().payload;
        assert_eq!(names, vec!["a", "b"]);
        shared.lock().await.close().await;
        assert_eq!(quit_count(&server).await, 1);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let server = FakeServer::start().await;
        let port = server.port();
        drop(server);
        // The accept loop is gone, the port refuses or never greets.
        let mut config = ClientConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..ClientConfig::default()
        };
        config.connect_timeout_secs = 2;
        config.reply_timeout_secs = 2;
        let err = FtpClient::from_config(&config)
            .unwrap()
            .delete("/x")
            .await
            .unwrap_err();
        assert!(matches!(err, FtpError::Connection(_)));
    }

    #[test]
    fn test_from_config_validates() {
        let config = ClientConfig::default();
        assert!(matches!(
            FtpClient::from_config(&config),
            Err(FtpError::Config(_))
        ));

        let config = ClientConfig {
            host: "ftp.example.org".to_string(),
            passive: true,
            ..ClientConfig::default()
        };
        let client = FtpClient::from_config(&config).unwrap();
        assert_eq!(client.host(), "ftp.example.org");
        assert_eq!(client.port(), 21);
        assert!(client.options().passive);
    }
}
