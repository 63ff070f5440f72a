pub mod stock_alert_worker;
