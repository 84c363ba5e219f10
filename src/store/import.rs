//! CSV team import (`id,name` header) for seeding a store.

use std::io::Read;

use crate::models::Team;

/// Read teams from CSV. Names are trimmed; rows with an empty name are skipped.
pub fn read_teams_csv<R: Read>(reader: R) -> Result<Vec<Team>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut teams = Vec::new();
    for row in rdr.deserialize::<Team>() {
        let team = row?;
        if team.name.is_empty() {
            log::warn!("Skipping team {} with empty name", team.id);
            continue;
        }
        teams.push(team);
    }
    Ok(teams)
}
