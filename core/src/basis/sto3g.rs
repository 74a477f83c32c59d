/// STO-3G minimal basis for hydrogen through neon, in Basis Set Exchange JSON form.
pub(crate) const STO_3G: &str = r#"{
    "name": "STO-3G",
    "elements": {
        "1": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["3.42525091", "0.62391373", "0.16885540"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]}
            ]
        },
        "2": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["6.36242139", "1.15892300", "0.31364979"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]}
            ]
        },
        "3": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["16.1195750", "2.9362007", "0.7946505"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["0.6362897", "0.1478601", "0.0480887"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        },
        "4": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["30.1678710", "5.4951153", "1.4871927"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["1.3148331", "0.3055389", "0.0993707"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        },
        "5": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["48.7911130", "8.8873622", "2.4052670"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["2.2369561", "0.5198205", "0.1690618"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        },
        "6": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["71.6168370", "13.0450960", "3.5305122"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["2.9412494", "0.6834831", "0.2222899"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        },
        "7": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["99.1061690", "18.0523120", "4.8856602"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["3.7804559", "0.8784966", "0.2857144"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        },
        "8": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["130.7093200", "23.8088610", "6.4436083"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["5.0331513", "1.1695961", "0.3803890"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        },
        "9": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["166.6791300", "30.3608120", "8.2168207"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["6.4648032", "1.5022812", "0.4885885"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        },
        "10": {
            "electron_shells": [
                {"function_type": "gto", "angular_momentum": [0], "exponents": ["207.0156100", "37.7081510", "10.2052970"], "coefficients": [["0.15432897", "0.53532814", "0.44463454"]]},
                {"function_type": "gto", "angular_momentum": [0, 1], "exponents": ["8.2463151", "1.9162662", "0.6232293"], "coefficients": [["-0.09996723", "0.39951283", "0.70011547"], ["0.15591627", "0.60768372", "0.39195739"]]}
            ]
        }
    }
}"#;
