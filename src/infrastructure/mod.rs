pub mod binance;
pub mod http_client_factory;
pub mod mock;
