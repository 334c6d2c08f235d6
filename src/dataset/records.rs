use crate::types::DistrictRecord;

fn record(code: u32, year: u16, name: &str, area: f64, parents: &[u32]) -> DistrictRecord {
    DistrictRecord {
        code,
        year,
        name: name.to_string(),
        area,
        parents: parents.to_vec(),
    }
}

/// The shipped dataset: every Chhattisgarh district with its LGD code,
/// formation year, area at formation in square kilometers, and the
/// districts it was carved from. Order matches the official table.
pub fn embedded() -> Vec<DistrictRecord> {
    vec![
        record(470, 1998, "Bastar", 14970.0, &[]),
        record(472, 1998, "Bilaspur", 8270.0, &[]),
        record(474, 1998, "Durg", 8537.0, &[]),
        record(478, 1998, "Raigarh", 7086.0, &[]),
        record(480, 1998, "Raipur", 13083.0, &[]),
        record(481, 1998, "Rajnandgaon", 8070.0, &[]),
        record(482, 1998, "Surguja", 15731.0, &[]),
        record(473, 1998, "Dantewada", 3410.50, &[470]),
        record(476, 1998, "Kanker", 7161.0, &[470]),
        record(475, 1998, "Janjgir-Champa", 4466.74, &[472]),
        record(477, 1998, "Korba", 7145.44, &[472]),
        record(479, 1998, "Jashpur", 5838.0, &[478]),
        record(471, 1998, "Dhamtari", 4084.0, &[480]),
        record(469, 1998, "Mahasamund", 4790.0, &[480]),
        record(468, 1998, "Koriya", 5977.0, &[482]),
        record(467, 1998, "Kabirdham", 4447.05, &[472]),
        record(601, 2007, "Bijapur", 6562.48, &[473]),
        record(602, 2007, "Narayanpur", 7010.0, &[470]),
        record(613, 2012, "Balod", 3527.0, &[474]),
        record(614, 2012, "Bemetara", 2854.81, &[474]),
        record(615, 2012, "Baloda Bazar", 3733.87, &[480]),
        record(616, 2012, "Gariaband", 5822.86, &[480]),
        record(617, 2012, "Mungeli", 2750.36, &[472]),
        record(618, 2012, "Kondagaon", 7769.0, &[470]),
        record(619, 2012, "Sukma", 5636.0, &[473]),
        record(612, 2012, "Balrampur-Ramanujganj", 6016.0, &[482]),
        record(620, 2012, "Surajpur", 2786.76, &[482]),
        record(727, 2020, "Gaurela-Pendra-Marwahi", 2307.39, &[472]),
        record(732, 2022, "Khairagarh-Chhuikhadan-Gandai", 1553.84, &[481]),
        record(731, 2022, "Manendragarh-Chirmiri-Bharatpur", 4226.0, &[468]),
        record(730, 2022, "Mohla-Manpur-Ambagarh Chowki", 2145.29, &[481]),
        record(734, 2022, "Sakti", 1600.0, &[475]),
        record(733, 2022, "Sarangarh-Bilaigarh", 1650.0, &[478, 615]),
    ]
}
