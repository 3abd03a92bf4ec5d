//! SSH 交互式 shell 后端（libssh2）
//!
//! 连接流程：TCP 连接（带超时）→ SSH 握手 → 认证 → 申请 PTY → 启动 shell
//! → 等待登录横幅输出完毕并丢弃。
//!
//! shell 启动后 session 切换为非阻塞模式，读取走 `WouldBlock`，
//! 写入时临时切回阻塞模式保证整行写出。

use crate::{ConnectError, ConnectErrorKind, ShellChannel, ShellError};
use bytes::Bytes;
use ssh2::{Channel, Session};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 单次读取的缓冲区大小
const RECV_CHUNK: usize = 65536;

/// 认证方式
#[derive(Clone)]
pub enum Credential {
    /// 密码认证
    Password(String),
    /// 私钥文件认证
    KeyFile {
        path: PathBuf,
        passphrase: Option<String>,
    },
    /// 通过 ssh-agent 认证
    Agent,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 不打印口令
        match self {
            Credential::Password(_) => f.write_str("Password(***)"),
            Credential::KeyFile { path, .. } => {
                f.debug_struct("KeyFile").field("path", path).finish_non_exhaustive()
            },
            Credential::Agent => f.write_str("Agent"),
        }
    }
}

/// 会话配置
///
/// 命令经 PTY 以整行发送。设备端终端处于规范模式时单行输入上限通常为
/// 4095 字节，4096 点的波形表约 37 KB，需要设备端的行缓冲足够大
/// （或关闭规范模式）才能完整收到。
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// 主机名或 IP
    pub host: String,
    /// SSH 端口
    pub port: u16,
    /// 用户名
    pub user: String,
    /// 认证方式
    pub credential: Credential,
    /// 连接超时（TCP 连接 + 握手 + 认证）
    pub connect_timeout: Duration,
    /// 启动 shell 后等待横幅输出的时间
    pub banner_settle: Duration,
    /// PTY 终端类型（决定设备端的行规程，见结构体说明）
    pub pty_term: String,
}

impl ShellConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>, credential: Credential) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            credential,
            connect_timeout: Duration::from_secs(10),
            banner_settle: Duration::from_millis(500),
            pty_term: "xterm".to_string(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn banner_settle(mut self, settle: Duration) -> Self {
        self.banner_settle = settle;
        self
    }
}

/// SSH 交互式 shell
pub struct SshShell {
    host: String,
    session: Option<Session>,
    channel: Option<Channel>,
}

impl SshShell {
    /// 建立认证连接并启动交互式 shell
    ///
    /// 返回前已丢弃登录横幅（MOTD）。
    ///
    /// # Errors
    /// - `ShellError::Connect`: 网络、握手、认证失败或超时
    pub fn open(config: &ShellConfig) -> Result<Self, ShellError> {
        let host = config.host.clone();
        let connect_err = |kind: ConnectErrorKind, message: String| {
            ConnectError::new(host.clone(), kind, message)
        };

        let tcp = connect_tcp(config).map_err(|e| {
            let kind = if e.kind() == io::ErrorKind::TimedOut {
                ConnectErrorKind::Timeout
            } else {
                ConnectErrorKind::Network
            };
            connect_err(kind, e.to_string())
        })?;

        let mut session =
            Session::new().map_err(|e| connect_err(ConnectErrorKind::Handshake, e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(timeout_ms(config.connect_timeout));
        session
            .handshake()
            .map_err(|e| connect_err(handshake_kind(&e), e.to_string()))?;

        authenticate(&session, config).map_err(|e| connect_err(ConnectErrorKind::Auth, e))?;

        let mut channel = session
            .channel_session()
            .map_err(|e| connect_err(ConnectErrorKind::Channel, e.to_string()))?;
        channel
            .request_pty(&config.pty_term, None, None)
            .map_err(|e| connect_err(ConnectErrorKind::Channel, e.to_string()))?;
        channel
            .shell()
            .map_err(|e| connect_err(ConnectErrorKind::Channel, e.to_string()))?;

        session.set_blocking(false);
        info!("SSH shell opened: {}@{}:{}", config.user, config.host, config.port);

        let mut shell = Self {
            host: config.host.clone(),
            session: Some(session),
            channel: Some(channel),
        };

        std::thread::sleep(config.banner_settle);
        let discarded = shell.drain()?;
        debug!("Discarded {} banner bytes", discarded);

        Ok(shell)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn parts(&mut self) -> Result<(&Session, &mut Channel), ShellError> {
        match (self.session.as_ref(), self.channel.as_mut()) {
            (Some(session), Some(channel)) => Ok((session, channel)),
            _ => Err(ShellError::Closed),
        }
    }
}

impl ShellChannel for SshShell {
    fn send(&mut self, bytes: &[u8]) -> Result<(), ShellError> {
        let (session, channel) = self.parts()?;
        session.set_blocking(true);
        let result = channel.write_all(bytes).and_then(|_| channel.flush());
        session.set_blocking(false);
        result?;
        Ok(())
    }

    fn try_receive(&mut self) -> Result<Option<Bytes>, ShellError> {
        let (_, channel) = self.parts()?;
        let mut buf = vec![0u8; RECV_CHUNK];
        match channel.read(&mut buf) {
            Ok(0) if channel.eof() => Err(ShellError::Closed),
            Ok(0) => Ok(None),
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(Bytes::from(buf)))
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&mut self) -> Result<(), ShellError> {
        // 先关 shell 再断连接；半关闭状态下的错误只记录不返回
        if let Some(mut channel) = self.channel.take() {
            if let Some(session) = self.session.as_ref() {
                session.set_blocking(true);
            }
            if let Err(e) = channel.close() {
                warn!("Failed to close shell channel on {}: {}", self.host, e);
            }
        }
        if let Some(session) = self.session.take()
            && let Err(e) = session.disconnect(None, "ffpulse closing", None)
        {
            warn!("Failed to disconnect from {}: {}", self.host, e);
        }
        Ok(())
    }
}

impl Drop for SshShell {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn connect_tcp(config: &ShellConfig) -> io::Result<TcpStream> {
    let addrs: Vec<SocketAddr> = (config.host.as_str(), config.port).to_socket_addrs()?.collect();
    let mut last_err =
        io::Error::new(io::ErrorKind::NotFound, format!("no address for {}", config.host));
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, config.connect_timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = e,
        }
    }
    Err(last_err)
}

fn authenticate(session: &Session, config: &ShellConfig) -> Result<(), String> {
    let result = match &config.credential {
        Credential::Password(password) => session.userauth_password(&config.user, password),
        Credential::KeyFile { path, passphrase } => {
            session.userauth_pubkey_file(&config.user, None, path, passphrase.as_deref())
        },
        Credential::Agent => session.userauth_agent(&config.user),
    };
    result.map_err(|e| e.to_string())?;

    if session.authenticated() {
        Ok(())
    } else {
        Err(format!("user {} not authenticated", config.user))
    }
}

fn handshake_kind(err: &ssh2::Error) -> ConnectErrorKind {
    // LIBSSH2_ERROR_TIMEOUT
    if matches!(err.code(), ssh2::ErrorCode::Session(-9)) {
        ConnectErrorKind::Timeout
    } else {
        ConnectErrorKind::Handshake
    }
}

fn timeout_ms(timeout: Duration) -> u32 {
    timeout.as_millis().min(u32::MAX as u128) as u32
}
