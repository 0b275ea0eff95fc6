//! Server Configuration

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub bind: String,

    /// Port number
    pub port: u16,

    /// Runtime worker threads (0 = auto-detect)
    pub workers: usize,

    /// Memoize query results in front of the engine
    pub cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 1234,
            workers: num_cpus::get(),
            cache: true,
        }
    }
}

impl Config {
    /// Create a new config with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Create a new config with custom bind address
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Set the number of runtime worker threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable or disable the query cache
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// `bind:port`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Worker thread count with auto-detection resolved
    pub fn worker_threads(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}
