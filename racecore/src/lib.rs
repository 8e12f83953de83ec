pub mod core {
    pub mod car;
    pub mod championship;
    pub mod class;
    pub mod error;
    pub mod handle_race;
    pub mod matchmaking;
    pub mod performance;
    pub mod race;
    pub mod route;
    pub mod weather;
}
pub mod pre {
    pub mod read_sim_pars;
    pub mod sim_opts;
}
pub mod post {
    pub mod race_result;
}
