use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

/// Behaviour knobs of the scripted server.
#[derive(Debug, Clone)]
pub struct FakeServerConfig {
    /// Raw greeting, CRLF terminated lines.
    pub greeting: String,
    pub username: String,
    pub password: String,
    /// When false, USER alone logs in with 230.
    pub password_required: bool,
    /// Whether the dedicated CHMOD verb is understood.
    pub chmod_supported: bool,
    /// Address put in the 227 reply instead of the listener's own.
    pub pasv_announce: Option<Ipv4Addr>,
    /// Transfers open their data connection, then never move a byte.
    pub stall_transfers: bool,
    /// Canned reply lines by verb, answered once logged in.
    pub overrides: BTreeMap<String, String>,
}

impl FakeServerConfig {
    pub fn with_override(mut self, verb: &str, reply: &str) -> Self {
        self.overrides.insert(verb.to_string(), reply.to_string());
        self
    }
}

impl Default for FakeServerConfig {
    fn default() -> Self {
        FakeServerConfig {
            greeting: "220-rouilleftp test server\r\n220 Ready.\r\n".to_string(),
            username: "tester".to_string(),
            password: "secret".to_string(),
            password_required: true,
            chmod_supported: false,
            pasv_announce: None,
            stall_transfers: false,
            overrides: BTreeMap::new(),
        }
    }
}

/// In-memory file system and command log shared by every connection.
#[derive(Debug, Default)]
pub struct ServerState {
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    pub commands: Vec<String>,
}

pub struct FakeServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
    handle: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start() -> FakeServer {
        FakeServer::start_with(FakeServerConfig::default()).await
    }

    pub async fn start_with(config: FakeServerConfig) -> FakeServer {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind fake server");
        let addr = listener.local_addr().expect("fake server address");
        let mut state = ServerState::default();
        state.dirs.insert("/".to_string());
        let state = Arc::new(Mutex::new(state));
        let config = Arc::new(config);

        let shared = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            loop {
                let Ok((socket, peer)) = listener.accept().await else {
                    break;
                };
                debug!("Fake server: connection from {:?}", peer);
                let state = Arc::clone(&shared);
                let config = Arc::clone(&config);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, config, state).await {
                        debug!("Fake server: connection error: {:?}", e);
                    }
                });
            }
        });

        FakeServer {
            addr,
            state,
            handle,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub async fn put_file(&self, path: &str, data: &[u8]) {
        self.state
            .lock()
            .await
            .files
            .insert(path.to_string(), data.to_vec());
    }

    pub async fn add_dir(&self, path: &str) {
        self.state.lock().await.dirs.insert(path.to_string());
    }

    pub async fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().await.files.get(path).cloned()
    }

    pub async fn has_dir(&self, path: &str) -> bool {
        self.state.lock().await.dirs.contains(path)
    }

    /// Every command line received so far, across connections.
    pub async fn commands(&self) -> Vec<String> {
        self.state.lock().await.commands.clone()
    }

    /// Verbs received so far, in order.
    pub async fn verbs(&self) -> Vec<String> {
        self.commands()
            .await
            .iter()
            .map(|line| line.split(' ').next().unwrap_or("").to_string())
            .collect()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

enum PendingData {
    None,
    Passive(TcpListener),
    Active(SocketAddrV4),
}

struct Connection {
    writer: OwnedWriteHalf,
    config: Arc<FakeServerConfig>,
    state: Arc<Mutex<ServerState>>,
    cwd: String,
    user: Option<String>,
    logged_in: bool,
    rename_from: Option<String>,
    pending: PendingData,
}

async fn handle_connection(
    socket: TcpStream,
    config: Arc<FakeServerConfig>,
    state: Arc<Mutex<ServerState>>,
) -> io::Result<()> {
    let (reader, writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut conn = Connection {
        writer,
        config,
        state,
        cwd: "/".to_string(),
        user: None,
        logged_in: false,
        rename_from: None,
        pending: PendingData::None,
    };

    let greeting = conn.config.greeting.clone();
    conn.writer.write_all(greeting.as_bytes()).await?;
    if !greeting.starts_with('2') && !greeting.starts_with('1') {
        return Ok(());
    }

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let command = line.trim_end_matches(['\r', '\n']).to_string();
        conn.state.lock().await.commands.push(command.clone());

        let (verb, arg) = match command.split_once(' ') {
            Some((verb, arg)) => (verb.to_ascii_uppercase(), arg.to_string()),
            None => (command.to_ascii_uppercase(), String::new()),
        };
        if !conn.dispatch(&verb, &arg).await? {
            break;
        }
    }
    Ok(())
}

impl Connection {
    async fn reply(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await
    }

    fn resolve(&self, arg: &str) -> String {
        let joined = if arg.starts_with('/') {
            arg.to_string()
        } else {
            format!("{}/{}", self.cwd.trim_end_matches('/'), arg)
        };
        let mut parts: Vec<&str> = Vec::new();
        for part in joined.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        format!("/{}", parts.join("/"))
    }

    /// Handles one command. Returns false once the connection should end.
    async fn dispatch(&mut self, verb: &str, arg: &str) -> io::Result<bool> {
        match verb {
            "USER" => {
                self.user = Some(arg.to_string());
                if self.config.password_required {
                    self.reply("331 Password required.").await?;
                } else if arg == self.config.username {
                    self.logged_in = true;
                    self.reply("230 User logged in, proceed.").await?;
                } else {
                    self.reply("530 Login incorrect.").await?;
                }
                return Ok(true);
            }
            "PASS" => {
                let ok = self.user.as_deref() == Some(self.config.username.as_str())
                    && arg == self.config.password;
                if ok {
                    self.logged_in = true;
                    self.reply("230 User logged in.").await?;
                } else {
                    self.reply("530 Login incorrect.").await?;
                }
                return Ok(true);
            }
            "QUIT" => {
                self.reply("221 Goodbye.").await?;
                return Ok(false);
            }
            "NOOP" => {
                self.reply("200 NOOP ok.").await?;
                return Ok(true);
            }
            _ if !self.logged_in => {
                self.reply("530 Please login with USER and PASS.").await?;
                return Ok(true);
            }
            _ => {}
        }

        if let Some(canned) = self.config.overrides.get(verb).cloned() {
            self.reply(&canned).await?;
            return Ok(true);
        }

        match verb {
            "TYPE" => match arg {
                "A" | "I" => self.reply(&format!("200 Type set to {}.", arg)).await?,
                _ => self.reply("504 Type not supported.").await?,
            },
            "PASV" => {
                let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
                let port = listener.local_addr()?.port();
                self.pending = PendingData::Passive(listener);
                let ip = self.config.pasv_announce.unwrap_or(Ipv4Addr::LOCALHOST);
                let text = format_pasv_reply(SocketAddrV4::new(ip, port));
                self.reply(&text).await?;
            }
            "PORT" => match parse_port_argument(arg) {
                Some(addr) => {
                    self.pending = PendingData::Active(addr);
                    self.reply("200 PORT command successful.").await?;
                }
                None => self.reply("501 Illegal PORT command.").await?,
            },
            "STOR" => {
                let path = self.resolve(arg);
                let Some(mut data) = self.open_data().await? else {
                    return Ok(true);
                };
                let mut content = Vec::new();
                data.read_to_end(&mut content).await?;
                self.state.lock().await.files.insert(path, content);
                self.reply("226 Transfer complete.").await?;
            }
            "RETR" => {
                let path = self.resolve(arg);
                let content = self.state.lock().await.files.get(&path).cloned();
                let Some(content) = content else {
                    self.pending = PendingData::None;
                    self.reply("550 File not found.").await?;
                    return Ok(true);
                };
                let Some(mut data) = self.open_data().await? else {
                    return Ok(true);
                };
                data.write_all(&content).await?;
                data.shutdown().await?;
                drop(data);
                self.reply("226 Transfer complete.").await?;
            }
            "NLST" | "LIST" => {
                let dir = self.resolve(arg);
                let listing = self.listing(&dir, verb == "LIST").await;
                let Some(mut data) = self.open_data().await? else {
                    return Ok(true);
                };
                data.write_all(listing.as_bytes()).await?;
                data.shutdown().await?;
                drop(data);
                self.reply("226 Directory send OK.").await?;
            }
            "SIZE" => {
                let path = self.resolve(arg);
                let size = self.state.lock().await.files.get(&path).map(Vec::len);
                match size {
                    Some(size) => self.reply(&format!("213 {}", size)).await?,
                    None => self.reply("550 File not found").await?,
                }
            }
            "DELE" => {
                let path = self.resolve(arg);
                let removed = self.state.lock().await.files.remove(&path).is_some();
                if removed {
                    self.reply("250 File deleted.").await?;
                } else {
                    self.reply("550 Permission denied.").await?;
                }
            }
            "RNFR" => {
                let path = self.resolve(arg);
                let exists = {
                    let state = self.state.lock().await;
                    state.files.contains_key(&path) || state.dirs.contains(&path)
                };
                if exists {
                    self.rename_from = Some(path);
                    self.reply("350 Ready for RNTO.").await?;
                } else {
                    self.reply("550 File not found.").await?;
                }
            }
            "RNTO" => match self.rename_from.take() {
                Some(from) => {
                    let to = self.resolve(arg);
                    let mut state = self.state.lock().await;
                    if let Some(content) = state.files.remove(&from) {
                        state.files.insert(to, content);
                    } else if state.dirs.remove(&from) {
                        state.dirs.insert(to);
                    }
                    drop(state);
                    self.reply("250 Rename successful.").await?;
                }
                None => self.reply("503 RNFR required first.").await?,
            },
            "MKD" => {
                let path = self.resolve(arg);
                let created = self.state.lock().await.dirs.insert(path.clone());
                if created {
                    self.reply(&format!("257 \"{}\" created.", path)).await?;
                } else {
                    self.reply("550 Directory already exists.").await?;
                }
            }
            "RMD" => {
                let path = self.resolve(arg);
                let prefix = format!("{}/", path);
                let mut state = self.state.lock().await;
                let occupied = state.files.keys().any(|f| f.starts_with(&prefix))
                    || state.dirs.iter().any(|d| d.starts_with(&prefix));
                let removed = !occupied && path != "/" && state.dirs.remove(&path);
                drop(state);
                if removed {
                    self.reply("250 Directory removed.").await?;
                } else {
                    self.reply("550 Remove directory operation failed.").await?;
                }
            }
            "CWD" => {
                let path = self.resolve(arg);
                let exists = self.state.lock().await.dirs.contains(&path);
                if exists {
                    self.cwd = path;
                    self.reply("250 Directory successfully changed.").await?;
                } else {
                    self.reply("550 Failed to change directory.").await?;
                }
            }
            "PWD" => {
                let text = format!("257 \"{}\" is the current directory", self.cwd);
                self.reply(&text).await?;
            }
            "CHMOD" if self.config.chmod_supported => {
                self.reply("200 CHMOD command ok.").await?;
            }
            "SITE" if arg.to_ascii_uppercase().starts_with("CHMOD ") => {
                self.reply("200 SITE CHMOD command ok.").await?;
            }
            "CHMOD" => self.reply("500 Unknown command.").await?,
            _ => self.reply("502 Command not implemented.").await?,
        }
        Ok(true)
    }

    async fn listing(&self, dir: &str, long: bool) -> String {
        let prefix = if dir == "/" {
            "/".to_string()
        } else {
            format!("{}/", dir)
        };
        let state = self.state.lock().await;
        let children = |path: &String| -> Option<String> {
            let rest = path.strip_prefix(&prefix)?;
            (!rest.is_empty() && !rest.contains('/')).then(|| rest.to_string())
        };

        let mut out = String::new();
        for dir in state.dirs.iter() {
            if let Some(name) = children(dir) {
                if long {
                    out.push_str(&format!("drwxr-xr-x 2 ftp ftp 0 Jan 01 00:00 {}\r\n", name));
                } else {
                    out.push_str(&format!("{}\r\n", name));
                }
            }
        }
        for (file, content) in state.files.iter() {
            if let Some(name) = children(file) {
                if long {
                    out.push_str(&format!(
                        "-rw-r--r-- 1 ftp ftp {} Jan 01 00:00 {}\r\n",
                        content.len(),
                        name
                    ));
                } else {
                    out.push_str(&format!("{}\r\n", name));
                }
            }
        }
        out
    }

    /// Sends 150 and connects the negotiated data channel.
    async fn open_data(&mut self) -> io::Result<Option<TcpStream>> {
        let stream = self.connect_data().await?;
        if let (Some(stream), true) = (&stream, self.config.stall_transfers) {
            debug!("Fake server: stalling data connection {:?}", stream.peer_addr());
            sleep(Duration::from_secs(3600)).await;
        }
        Ok(stream)
    }

    async fn connect_data(&mut self) -> io::Result<Option<TcpStream>> {
        match std::mem::replace(&mut self.pending, PendingData::None) {
            PendingData::None => {
                self.reply("425 Use PORT or PASV first.").await?;
                Ok(None)
            }
            PendingData::Passive(listener) => {
                self.reply("150 Opening data connection.").await?;
                let (stream, _) = listener.accept().await?;
                Ok(Some(stream))
            }
            PendingData::Active(addr) => {
                self.reply("150 Opening data connection.").await?;
                let stream = TcpStream::connect(addr).await?;
                Ok(Some(stream))
            }
        }
    }
}

/// Formats the 227 reply announcing a passive listener, without CRLF.
fn format_pasv_reply(addr: SocketAddrV4) -> String {
    let ip = addr.ip().octets();
    format!(
        "227 Entering Passive Mode ({},{},{},{},{},{}).",
        ip[0],
        ip[1],
        ip[2],
        ip[3],
        addr.port() / 256,
        addr.port() % 256
    )
}

/// Parses the argument of a PORT command back into an address.
fn parse_port_argument(arg: &str) -> Option<SocketAddrV4> {
    let parts: Vec<&str> = arg.trim().split(',').collect();
    if parts.len() != 6 {
        return None;
    }
    let nums: Vec<u8> = parts
        .iter()
        .map(|x| x.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .ok()?;
    let ip = Ipv4Addr::new(nums[0], nums[1], nums[2], nums[3]);
    let port = (nums[4] as u16) << 8 | nums[5] as u16;
    Some(SocketAddrV4::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_network::pasv::parse_pasv_reply;
    use crate::core_network::port::encode_port_argument;
    use crate::core_reply::ReplyParser;

    #[test]
    fn test_pasv_reply_is_understood_by_client() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 20), 40001);
        let line = format_pasv_reply(addr);
        assert_eq!(line, "227 Entering Passive Mode (192,168,1,20,156,65).");
        let parsed = ReplyParser::parse_all(&format!("{}\r\n", line)).unwrap();
        assert_eq!(parse_pasv_reply(&parsed[0]).unwrap(), addr);
    }

    #[test]
    fn test_port_argument_from_client() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 7), 1025);
        assert_eq!(parse_port_argument(&encode_port_argument(addr)), Some(addr));
        assert_eq!(parse_port_argument("10,0,0,7,4"), None);
        assert_eq!(parse_port_argument("10,0,0,256,4,1"), None);
        assert_eq!(parse_port_argument("a,b,c,d,e,f"), None);
    }
}
